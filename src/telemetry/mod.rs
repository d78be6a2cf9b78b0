pub mod classify;
pub mod history;
pub mod projector;

pub use classify::{classify, ValueClass};
pub use history::{ChartHistory, HistoryPoint, RollingHistory, HISTORY_CAPACITY};
pub use projector::TelemetryProjector;
