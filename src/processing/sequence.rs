//! Lazy, restartable pipelines.

use std::fmt;
use std::sync::Arc;

type Producer<'a, T> = dyn Fn() -> Box<dyn Iterator<Item = T> + 'a> + Send + Sync + 'a;

/// A lazy description of a transformation pipeline.
///
/// Intermediate operations ([`Sequence::filter`], [`Sequence::map`], [`Sequence::flat_map`]) only
/// record a step. Terminal operations ([`Sequence::iter`], [`Sequence::count`],
/// [`Sequence::to_vec`], [`Sequence::partition_by`], ...) run the whole pipeline from the source.
/// Every terminal call starts over; intermediate results are never cached.
///
/// Sequences are `Send + Sync` and cheap to clone, so one pipeline can be consumed from several
/// threads at once.
pub struct Sequence<'a, T> {
    producer: Arc<Producer<'a, T>>,
}

impl<'a, T: Sync + 'a> Sequence<'a, &'a T> {
    /// Start a pipeline over the items of a slice, in order.
    pub fn from_slice(items: &'a [T]) -> Self {
        Self::from_producer(move || Box::new(items.iter()))
    }
}

impl<'a, T: 'a> Sequence<'a, T> {
    /// Start a pipeline from a source factory.
    ///
    /// `source` is invoked once per terminal operation and must yield the same items each time for
    /// the sequence to be restartable.
    pub fn from_fn<F, I>(source: F) -> Self
    where
        F: Fn() -> I + Send + Sync + 'a,
        I: IntoIterator<Item = T>,
        I::IntoIter: 'a,
    {
        Self::from_producer(move || Box::new(source().into_iter()))
    }

    pub(crate) fn from_producer<F>(producer: F) -> Self
    where
        F: Fn() -> Box<dyn Iterator<Item = T> + 'a> + Send + Sync + 'a,
    {
        Self {
            producer: Arc::new(producer),
        }
    }

    pub(crate) fn into_producer(self) -> Arc<Producer<'a, T>> {
        self.producer
    }

    /// Run the pipeline and iterate its output.
    pub fn iter(&self) -> Box<dyn Iterator<Item = T> + 'a> {
        (self.producer)()
    }

    /// Run the pipeline and count its output.
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// Run the pipeline and collect its output in order.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// Run the pipeline and collect its output into any [`FromIterator`] container.
    pub fn collect<C>(&self) -> C
    where
        C: FromIterator<T>,
    {
        self.iter().collect()
    }

    /// Run the pipeline, calling `f` for each output item.
    pub fn for_each<F>(&self, f: F)
    where
        F: FnMut(T),
    {
        self.iter().for_each(f)
    }
}

impl<T> Clone for Sequence<'_, T> {
    fn clone(&self) -> Self {
        Self {
            producer: Arc::clone(&self.producer),
        }
    }
}

impl<T> fmt::Debug for Sequence<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence").finish_non_exhaustive()
    }
}

impl<'a, T: 'a> IntoIterator for &Sequence<'a, T> {
    type Item = T;
    type IntoIter = Box<dyn Iterator<Item = T> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
