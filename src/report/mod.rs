pub mod stats_log;

pub use stats_log::{ReportError, StatsLog, StatsRecord};
