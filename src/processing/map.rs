//! Lazy mapping and flat-mapping.

use std::sync::Arc;

use crate::processing::Sequence;
use crate::types::{Record, RecordSet};

impl<'a, T: 'a> Sequence<'a, T> {
    /// Transform every item with `selector`. The output has the same length and order as the input.
    pub fn map<U, S>(self, selector: S) -> Sequence<'a, U>
    where
        U: 'a,
        S: Fn(T) -> U + Send + Sync + 'a,
    {
        let upstream = self.into_producer();
        let selector = Arc::new(selector);
        Sequence::from_producer(move || {
            let selector = Arc::clone(&selector);
            Box::new(upstream().map(move |item| selector(item)))
        })
    }

    /// Replace every item with the items of `selector(item)`, concatenated in input order.
    ///
    /// Flattens exactly one level: if `selector` yields nested collections, those stay nested.
    pub fn flat_map<U, I, S>(self, selector: S) -> Sequence<'a, U>
    where
        U: 'a,
        I: IntoIterator<Item = U> + 'a,
        I::IntoIter: 'a,
        S: Fn(T) -> I + Send + Sync + 'a,
    {
        let upstream = self.into_producer();
        let selector = Arc::new(selector);
        Sequence::from_producer(move || {
            let selector = Arc::clone(&selector);
            Box::new(upstream().flat_map(move |item| selector(item)))
        })
    }
}

/// Returns a lazy sequence of `selector(record)` for every record, in order.
pub fn map<'a, U, S>(records: &'a RecordSet, selector: S) -> Sequence<'a, U>
where
    U: 'a,
    S: Fn(&'a Record) -> U + Send + Sync + 'a,
{
    records.seq().map(selector)
}

/// Returns a lazy sequence concatenating `selector(record)` for every record, in order.
pub fn flat_map<'a, U, I, S>(records: &'a RecordSet, selector: S) -> Sequence<'a, U>
where
    U: 'a,
    I: IntoIterator<Item = U> + 'a,
    I::IntoIter: 'a,
    S: Fn(&'a Record) -> I + Send + Sync + 'a,
{
    records.seq().flat_map(selector)
}

#[cfg(test)]
mod tests {
    use super::{flat_map, map};
    use crate::types::{Record, RecordSet};

    fn sample_records() -> RecordSet {
        RecordSet::new(vec![
            Record::new("sedan", "BMW", "530", 1998),
            Record::new("sedan", "Mercedes", "E-Class", 1999),
            Record::new("suv", "Toyota", "RAV4", 1987),
        ])
    }

    #[test]
    fn map_selects_one_value_per_record() {
        let cars = sample_records();
        let makes = map(&cars, |car| car.manufacturer()).to_vec();
        assert_eq!(makes, vec!["BMW", "Mercedes", "Toyota"]);
    }

    #[test]
    fn map_preserves_length_and_position() {
        let cars = RecordSet::sample();
        let capacities = map(&cars, |car| car.attribute() * 2).to_vec();

        assert_eq!(capacities.len(), cars.len());
        for (i, car) in cars.iter().enumerate() {
            assert_eq!(capacities[i], car.attribute() * 2);
        }
    }

    #[test]
    fn map_then_filter_drops_empty_values() {
        let cars = RecordSet::new(vec![
            Record::new("sedan", "", "unknown", 0),
            Record::new("suv", "Honda", "CR-V", 1997),
        ]);
        let makes = cars
            .seq()
            .map(|car| car.manufacturer())
            .filter(|make| !make.is_empty())
            .to_vec();
        assert_eq!(makes, vec!["Honda"]);
    }

    #[test]
    fn flat_map_concatenates_in_input_order() {
        let cars = sample_records();
        let out = flat_map(&cars, |car| [car.manufacturer(), car.model()]).to_vec();
        assert_eq!(
            out,
            vec!["BMW", "530", "Mercedes", "E-Class", "Toyota", "RAV4"]
        );
    }

    #[test]
    fn flat_map_length_is_sum_of_sub_sequence_lengths() {
        let cars = RecordSet::sample();
        // Sedans contribute two items, SUVs none.
        let out = cars.seq().flat_map(|car| {
            if car.category() == "sedan" {
                vec![car.manufacturer(), car.model()]
            } else {
                Vec::new()
            }
        });
        let expected: usize = cars
            .iter()
            .map(|car| if car.category() == "sedan" { 2 } else { 0 })
            .sum();
        assert_eq!(out.count(), expected);
        assert_eq!(out.to_vec()[..2], ["BMW", "530"]);
    }

    #[test]
    fn flat_map_flattens_exactly_one_level() {
        let cars = sample_records();
        let nested = cars
            .seq()
            .flat_map(|car| vec![vec![car.attribute()], vec![]])
            .to_vec();
        assert_eq!(nested, vec![vec![1998], vec![], vec![1999], vec![], vec![1987], vec![]]);
    }

    #[test]
    fn map_over_empty_record_set_is_empty() {
        let cars = RecordSet::new(Vec::new());
        assert!(map(&cars, |car| car.attribute()).to_vec().is_empty());
        assert_eq!(flat_map(&cars, |car| [car.model()]).count(), 0);
    }
}
