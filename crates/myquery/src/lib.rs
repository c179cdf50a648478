//! Client convenience layer over the myquery time-series retrieval service.
//!
//! The archiver stores named channels (PVs); myquery exposes them over HTTP
//! as JSON. This crate builds the query parameters each endpoint expects,
//! issues the requests, and shapes the responses into tabular results:
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use myquery::{Client, SamplerQuery};
//!
//! # async fn run() -> Result<(), myquery::MyqueryError> {
//! let start = NaiveDate::from_ymd_opt(2023, 5, 9)
//!     .expect("valid date")
//!     .and_hms_opt(12, 0, 0)
//!     .expect("valid time");
//! let query = SamplerQuery::new(
//!     start,
//!     60_000,
//!     10,
//!     vec!["R123GMES".to_string(), "R121GMES".to_string()],
//! );
//!
//! let client = Client::new()?;
//! let result = client.sampler(&query).await?;
//! assert_eq!(result.data.num_rows(), 10);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod query;
pub mod table;

pub use crate::client::{Client, CombinedIntervalResult};
pub use crate::config::{MyqueryConfig, load_config};
pub use crate::error::{MyqueryError, Result};
pub use crate::models::{
    ChannelMetadata, DisconnectEvent, IntervalResult, PointEvent, PointResult, SamplerResult,
    StatsBin, StatsResult, Value,
};
pub use crate::query::{
    ChannelQuery, IntervalQuery, PointQuery, SampleType, SamplerQuery, StatsQuery,
};
pub use crate::table::{SampleTable, Series};

/// Initialize diagnostics based on the MYQUERY_LOG environment variable.
pub use diagnostics::init_diagnostics;
