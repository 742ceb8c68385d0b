//! Export of run data for offline analysis
//!
//! Currently supports CSV export of windowed agent statistics.

mod statistics_csv;

pub use statistics_csv::StatisticsCsvWriter;
