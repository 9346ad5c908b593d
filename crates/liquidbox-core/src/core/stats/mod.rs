//! Time-series statistics: statistical inefficiency and automated
//! equilibration detection.

pub mod timeseries;

pub use timeseries::AutocorrelationDetector;
