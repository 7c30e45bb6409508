//! Lazy filtering.

use std::sync::Arc;

use crate::processing::Sequence;
use crate::types::{Record, RecordSet};

impl<'a, T: 'a> Sequence<'a, T> {
    /// Keep only the items for which `predicate` returns `true`, preserving their relative order.
    ///
    /// Lazy: `predicate` is not called until a terminal operation runs, and is called again on
    /// every subsequent terminal operation.
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'a,
    {
        let upstream = self.into_producer();
        let predicate = Arc::new(predicate);
        Self::from_producer(move || {
            let predicate = Arc::clone(&predicate);
            Box::new(upstream().filter(move |item| predicate(item)))
        })
    }
}

/// Returns a lazy sequence over the records of `records` for which `predicate` returns `true`.
///
/// This is a convenience wrapper around [`RecordSet::seq`] and [`Sequence::filter`].
pub fn filter<'a, P>(records: &'a RecordSet, predicate: P) -> Sequence<'a, &'a Record>
where
    P: Fn(&&'a Record) -> bool + Send + Sync + 'a,
{
    records.seq().filter(predicate)
}
