fn main() {
    if let Err(err) = appraisal_cli::run() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}
