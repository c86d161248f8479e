//! Historical data pipeline: fetch, validate, adjust, and gate a candle
//! sequence before it is handed to the indicator engine and simulator.

pub mod pipeline;
pub mod prepared;
pub mod source;
pub mod validation;

pub use pipeline::{prepare, warmup_start_date, PrepareRequest};
pub use prepared::PreparedData;
pub use source::{fetch_candles_with_retry, MarketDataSource, RealSleeper, Sleeper, SourceError};
pub use validation::{DataQualityReport, QualityCategory, QualityGrade, Validator};
