//! Mortality tables, death-age sampling and contract horizon resolution

mod table;
mod horizon;
pub mod loader;

pub use table::{MortalityRow, MortalityTable};
pub use horizon::{Horizon, HorizonPolicy, days_between_ages};
pub use loader::{load_mortality_table, load_mortality_table_from_reader};

/// Oldest age considered by the quantile and survival-target walks
pub const MAX_AGE: u32 = 120;
