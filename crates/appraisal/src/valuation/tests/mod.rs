pub(crate) mod common;

mod cost;
mod income;
mod reconciliation;
mod selector;
