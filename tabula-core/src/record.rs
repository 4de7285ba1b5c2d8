//! Types and traits for recording metrics of training and evaluation.
//!
//! * [`Record`] - A container of key-value pairs of various data types
//! * [`RecordValue`] - Values that can be stored in a record
//! * [`Recorder`] / [`AggregateRecorder`] - Destinations of records
//! * [`RecordStorage`] - Aggregation of scalar values over stored records
//! * [`BufferedRecorder`] - Keeps every record in memory
//! * [`NullRecorder`] - Discards every record
//! * [`LogRecorder`] - Aggregates stored records and writes them to the log
//!
//! # Basic Usage
//!
//! ```rust
//! use tabula_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("episode", RecordValue::Scalar(3.0));
//! record.insert("episode_return", RecordValue::Scalar(-7.0));
//! assert_eq!(record.get_scalar("episode_return").unwrap(), -7.0);
//! ```
mod base;
mod buffered_recorder;
mod log_recorder;
mod null_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use log_recorder::LogRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::{AggregateRecorder, Recorder};
pub use storage::RecordStorage;
