//! In-memory sequence transformations.
//!
//! The processing layer operates on lazy [`Sequence`] pipelines, usually started from a
//! [`crate::types::RecordSet`] with [`crate::types::RecordSet::seq`].
//!
//! Intermediate (lazy) operations:
//!
//! - [`Sequence::filter`] / [`filter()`]: keep items matching a predicate
//! - [`Sequence::map`] / [`map()`]: transform every item
//! - [`Sequence::flat_map`] / [`flat_map()`]: transform every item into zero or more items
//!
//! Terminal operations:
//!
//! - [`Sequence::iter`], [`Sequence::count`], [`Sequence::to_vec`], [`Sequence::collect`]
//! - [`Sequence::partition_by`] / [`partition_by()`]: split in two by a predicate
//! - [`Sequence::group_by`] / [`group_by()`]: bucket by key
//! - [`Sequence::group_by_then_project`] / [`group_by_then_project()`]: outer key → inner key → value
//!
//! ## Example: filter → map → group
//!
//! ```rust
//! use record_pipeline::types::RecordSet;
//!
//! let cars = RecordSet::sample();
//!
//! // Nothing runs yet: this only describes the pipeline.
//! let big_engines = cars
//!     .seq()
//!     .filter(|car| car.attribute() > 1990)
//!     .map(|car| car.manufacturer());
//!
//! // Each terminal call re-runs the pipeline from the source.
//! assert_eq!(big_engines.count(), 5);
//! assert_eq!(big_engines.to_vec()[..2], ["BMW", "Mercedes"]);
//!
//! let by_type = cars
//!     .seq()
//!     .group_by_then_project(
//!         |car| car.category(),
//!         |car| car.manufacturer(),
//!         |car| car.attribute(),
//!     )
//!     .unwrap();
//! assert_eq!(by_type["suv"]["Toyota"], 1987);
//! ```

pub mod filter;
pub mod group;
pub mod map;
pub mod partition;
mod sequence;

pub use filter::filter;
pub use group::{DuplicateKeyPolicy, NestedGroups, group_by, group_by_then_project};
pub use map::{flat_map, map};
pub use partition::{Partition, partition_by};
pub use sequence::Sequence;
