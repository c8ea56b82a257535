//! Domain types for the macro regime engine.

pub mod driver;
pub mod indicator;
pub mod record;
pub mod regime;
pub mod series;

pub use driver::DriverRecord;
pub use indicator::{
    Aggregation, Frequency, IndicatorSpec, IndicatorTable, Polarity, SeriesSpec, TableError,
    Transform,
};
pub use record::{ProjectedMonthRow, RunLogEntry, RunStatus};
pub use regime::{Regime, BEAR_THRESHOLD, BULL_THRESHOLD};
pub use series::{month_start, months_before, MonthlySeries, Observation, ObservationSeries};
