//! Fee drag, guarantee floor and payout statistics

mod processor;
mod summary;

pub use processor::{apply_annual_costs, floor_at_guarantee};
pub use summary::PayoutSummary;
