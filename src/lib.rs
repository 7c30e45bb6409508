//! `record-pipeline` is a small library of composable, order-preserving sequence operations over an
//! immutable, in-memory [`types::RecordSet`].
//!
//! The primary entrypoint is [`types::RecordSet::seq`], which starts a lazy
//! [`processing::Sequence`]. Intermediate operations (`filter`, `map`, `flat_map`) only describe the
//! pipeline; terminal operations (`count`, `to_vec`, `partition_by`, `group_by_then_project`, ...)
//! run it from the source, every time they are called.
//!
//! ## Records
//!
//! A [`types::Record`] is an immutable `(category, manufacturer, model, attribute)` tuple. The
//! bundled [`types::RecordSet::sample`] holds eight cars (body type, make, model, engine capacity).
//!
//! ## Quick example
//!
//! ```rust
//! use record_pipeline::processing::{filter, group_by_then_project, map, partition_by};
//! use record_pipeline::types::{Record, RecordSet};
//!
//! # fn main() -> Result<(), record_pipeline::PipelineError> {
//! let cars = RecordSet::new(vec![
//!     Record::new("sedan", "BMW", "530", 1998),
//!     Record::new("sedan", "Mercedes", "E-Class", 1999),
//!     Record::new("suv", "Toyota", "RAV4", 1987),
//! ]);
//!
//! let sedans = filter(&cars, |car| car.category() == "sedan").to_vec();
//! assert_eq!(sedans.len(), 2);
//!
//! let makes = map(&cars, |car| car.manufacturer()).to_vec();
//! assert_eq!(makes, ["BMW", "Mercedes", "Toyota"]);
//!
//! let split = partition_by(&cars, |car| car.category() == "sedan");
//! assert_eq!(split.rest[0].model(), "RAV4");
//!
//! let grouped = group_by_then_project(
//!     &cars,
//!     |car| car.category(),
//!     |car| car.manufacturer(),
//!     |car| car.attribute(),
//! )?;
//! assert_eq!(grouped["sedan"]["Mercedes"], 1999);
//! # Ok(())
//! # }
//! ```
//!
//! ### Duplicate inner keys
//!
//! [`processing::group_by_then_project`] rejects two records of one group with the same inner key
//! ([`PipelineError::DuplicateKey`]). Pass [`processing::DuplicateKeyPolicy::LastWriteWins`] to
//! [`processing::Sequence::group_by_then_project_with`] to keep the later value instead.
//!
//! ## Parallel execution
//!
//! [`execution::ExecutionEngine`] runs the same operations over a slice in chunks on a rayon pool.
//! Results are identical to the sequential operations.
//!
//! ```rust
//! use record_pipeline::execution::{ExecutionEngine, ExecutionOptions};
//! use record_pipeline::types::RecordSet;
//!
//! # fn main() -> Result<(), record_pipeline::PipelineError> {
//! let cars = RecordSet::sample();
//! let engine = ExecutionEngine::new(ExecutionOptions {
//!     num_threads: Some(2),
//!     chunk_size: 2,
//!     max_in_flight_chunks: 2,
//! })?;
//! let suvs = engine.filter_parallel(cars.as_slice(), |car| car.category() == "suv");
//! assert_eq!(suvs, cars.seq().filter(|car| car.category() == "suv").to_vec());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: records and the immutable record set
//! - [`processing`]: lazy sequences and terminal aggregations
//! - [`execution`]: optional chunked parallel engine with metrics and observers
//! - [`error`]: error types

pub mod error;
pub mod execution;
pub mod processing;
pub mod types;

pub use error::{PipelineError, PipelineResult};
