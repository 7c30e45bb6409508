//! Partitioning by a boolean predicate.

use serde::Serialize;

use crate::processing::Sequence;
use crate::types::{Record, RecordSet};

/// Result of [`Sequence::partition_by`]: exactly two groups, either of which may be empty.
///
/// Every input item lands in exactly one group and each group keeps the input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Partition<T> {
    /// Items for which the predicate returned `true`.
    pub matching: Vec<T>,
    /// Items for which the predicate returned `false`.
    pub rest: Vec<T>,
}

impl<T> Partition<T> {
    /// The group for a predicate outcome.
    pub fn get(&self, outcome: bool) -> &[T] {
        if outcome { &self.matching } else { &self.rest }
    }

    /// Total number of items across both groups.
    pub fn len(&self) -> usize {
        self.matching.len() + self.rest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matching.is_empty() && self.rest.is_empty()
    }

    /// Split into `(matching, rest)`.
    pub fn into_parts(self) -> (Vec<T>, Vec<T>) {
        (self.matching, self.rest)
    }
}

impl<'a, T: 'a> Sequence<'a, T> {
    /// Run the pipeline and split its output in two by `predicate`.
    pub fn partition_by<P>(&self, mut predicate: P) -> Partition<T>
    where
        P: FnMut(&T) -> bool,
    {
        let (matching, rest) = self.iter().partition(|item| predicate(item));
        Partition { matching, rest }
    }
}

/// Split the records of `records` in two by `predicate`.
pub fn partition_by<'a, P>(records: &'a RecordSet, predicate: P) -> Partition<&'a Record>
where
    P: FnMut(&&'a Record) -> bool,
{
    records.seq().partition_by(predicate)
}
