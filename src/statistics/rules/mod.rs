//! Built-in statistics rules.

pub use enforce_single_row::EnforceSingleRowStatsRule;
pub use limit::LimitStatsRule;
pub use output::OutputStatsRule;
pub use values::ValuesStatsRule;

mod enforce_single_row;
mod limit;
mod output;
mod values;
