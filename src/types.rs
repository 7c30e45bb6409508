//! Core data model types.
//!
//! A [`RecordSet`] is an ordered, immutable collection of [`Record`]s. It is built once and only
//! read afterwards; every processing operation produces a new collection or mapping.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::processing::Sequence;

/// A single immutable record: `(category, manufacturer, model, attribute)`.
///
/// In the bundled sample data these are a car's body type, make, model and engine capacity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Record {
    category: String,
    manufacturer: String,
    model: String,
    attribute: i64,
}

impl Record {
    /// Create a new record.
    pub fn new(
        category: impl Into<String>,
        manufacturer: impl Into<String>,
        model: impl Into<String>,
        attribute: i64,
    ) -> Self {
        Self {
            category: category.into(),
            manufacturer: manufacturer.into(),
            model: model.into(),
            attribute,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn manufacturer(&self) -> &str {
        &self.manufacturer
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn attribute(&self) -> i64 {
        self.attribute
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} ({})",
            self.category, self.manufacturer, self.model, self.attribute
        )
    }
}

/// Ordered, immutable collection of records.
///
/// Storage is shared, so cloning a `RecordSet` is cheap and clones observe the same records. No
/// mutable access is exposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    records: Arc<[Record]>,
}

impl RecordSet {
    /// Create a record set, preserving the order of `records`.
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: records.into(),
        }
    }

    /// The fixed sample fleet used by the demo binary.
    pub fn sample() -> Self {
        Self::new(vec![
            Record::new("sedan", "BMW", "530", 1998),
            Record::new("sedan", "Mercedes", "E-Class", 1999),
            Record::new("sedan", "Audi", "A5", 1984),
            Record::new("suv", "Toyota", "RAV4", 1987),
            Record::new("suv", "Honda", "CR-V", 1997),
            Record::new("suv", "Volkswagen", "Golf", 1395),
            Record::new("suv", "Ford2", "Mustang", 4951),
            Record::new("suv", "Ford", "Ranger", 1996),
        ])
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order.
    pub fn as_slice(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Start a lazy pipeline over the records.
    ///
    /// Nothing is evaluated until a terminal operation (e.g. [`Sequence::to_vec`]) is called.
    pub fn seq(&self) -> Sequence<'_, &Record> {
        Sequence::from_slice(self.as_slice())
    }
}

impl FromIterator<Record> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
