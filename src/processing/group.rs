//! Grouping and group-then-project aggregations.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt::Display;

use log::warn;

use crate::error::{PipelineError, PipelineResult};
use crate::processing::Sequence;
use crate::types::{Record, RecordSet};

/// Two-level mapping produced by [`Sequence::group_by_then_project`]: outer key → inner key → value.
pub type NestedGroups<K, IK, IV> = BTreeMap<K, BTreeMap<IK, IV>>;

/// What to do when two items in the same outer group project to the same inner key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeyPolicy {
    /// Fail with [`PipelineError::DuplicateKey`] (default).
    #[default]
    Reject,
    /// Keep the value of the item that appears last in input order.
    LastWriteWins,
}

impl<'a, T: 'a> Sequence<'a, T> {
    /// Run the pipeline and bucket its output by `key`, preserving input order within each bucket.
    pub fn group_by<K, F>(&self, mut key: F) -> BTreeMap<K, Vec<T>>
    where
        K: Ord,
        F: FnMut(&T) -> K,
    {
        self.iter().fold(BTreeMap::new(), |mut groups, item| {
            groups.entry(key(&item)).or_insert_with(Vec::new).push(item);
            groups
        })
    }

    /// Run the pipeline, group its output by `key`, and within each group map
    /// `inner_key(item)` to `inner_value(item)`.
    ///
    /// Fails with [`PipelineError::DuplicateKey`] if two items of one group share an inner key.
    /// Use [`Sequence::group_by_then_project_with`] to pick a different policy.
    pub fn group_by_then_project<K, IK, IV, FK, FIK, FIV>(
        &self,
        key: FK,
        inner_key: FIK,
        inner_value: FIV,
    ) -> PipelineResult<NestedGroups<K, IK, IV>>
    where
        K: Ord + Display,
        IK: Ord + Display,
        FK: FnMut(&T) -> K,
        FIK: FnMut(&T) -> IK,
        FIV: FnMut(&T) -> IV,
    {
        self.group_by_then_project_with(DuplicateKeyPolicy::Reject, key, inner_key, inner_value)
    }

    /// [`Sequence::group_by_then_project`] with an explicit [`DuplicateKeyPolicy`].
    pub fn group_by_then_project_with<K, IK, IV, FK, FIK, FIV>(
        &self,
        policy: DuplicateKeyPolicy,
        mut key: FK,
        mut inner_key: FIK,
        mut inner_value: FIV,
    ) -> PipelineResult<NestedGroups<K, IK, IV>>
    where
        K: Ord + Display,
        IK: Ord + Display,
        FK: FnMut(&T) -> K,
        FIK: FnMut(&T) -> IK,
        FIV: FnMut(&T) -> IV,
    {
        let mut groups = NestedGroups::new();
        for item in self.iter() {
            insert_projected(
                &mut groups,
                policy,
                key(&item),
                inner_key(&item),
                inner_value(&item),
            )?;
        }
        Ok(groups)
    }
}

/// Insert one projected item into `groups`, applying `policy` on inner-key collisions.
pub(crate) fn insert_projected<K, IK, IV>(
    groups: &mut NestedGroups<K, IK, IV>,
    policy: DuplicateKeyPolicy,
    key: K,
    inner_key: IK,
    inner_value: IV,
) -> PipelineResult<()>
where
    K: Ord + Display,
    IK: Ord + Display,
{
    match groups.get_mut(&key) {
        None => {
            groups.insert(key, BTreeMap::from([(inner_key, inner_value)]));
        }
        Some(inner) => match inner.entry(inner_key) {
            Entry::Vacant(slot) => {
                slot.insert(inner_value);
            }
            Entry::Occupied(mut slot) => match policy {
                DuplicateKeyPolicy::Reject => {
                    return Err(PipelineError::DuplicateKey {
                        group: key.to_string(),
                        key: slot.key().to_string(),
                    });
                }
                DuplicateKeyPolicy::LastWriteWins => {
                    warn!("overwriting duplicate key '{}' in group '{}'", slot.key(), key);
                    slot.insert(inner_value);
                }
            },
        },
    }
    Ok(())
}

/// Bucket the records of `records` by `key`.
pub fn group_by<'a, K, F>(records: &'a RecordSet, key: F) -> BTreeMap<K, Vec<&'a Record>>
where
    K: Ord,
    F: FnMut(&&'a Record) -> K,
{
    records.seq().group_by(key)
}

/// Group the records of `records` by `key`, then map `inner_key` to `inner_value` within each
/// group. Duplicate inner keys are rejected.
pub fn group_by_then_project<'a, K, IK, IV, FK, FIK, FIV>(
    records: &'a RecordSet,
    key: FK,
    inner_key: FIK,
    inner_value: FIV,
) -> PipelineResult<NestedGroups<K, IK, IV>>
where
    K: Ord + Display,
    IK: Ord + Display,
    FK: FnMut(&&'a Record) -> K,
    FIK: FnMut(&&'a Record) -> IK,
    FIV: FnMut(&&'a Record) -> IV,
{
    records.seq().group_by_then_project(key, inner_key, inner_value)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::{DuplicateKeyPolicy, group_by, group_by_then_project};
    use crate::error::PipelineError;
    use crate::types::{Record, RecordSet};

    fn sample_records() -> RecordSet {
        RecordSet::new(vec![
            Record::new("sedan", "BMW", "530", 1998),
            Record::new("sedan", "Mercedes", "E-Class", 1999),
            Record::new("suv", "Toyota", "RAV4", 1987),
        ])
    }

    #[test]
    fn group_by_then_project_builds_nested_mapping() {
        let cars = sample_records();
        let out = group_by_then_project(
            &cars,
            |car| car.category().to_string(),
            |car| car.manufacturer().to_string(),
            |car| car.attribute(),
        )
        .unwrap();

        let expected = BTreeMap::from([
            (
                "sedan".to_string(),
                BTreeMap::from([("BMW".to_string(), 1998), ("Mercedes".to_string(), 1999)]),
            ),
            (
                "suv".to_string(),
                BTreeMap::from([("Toyota".to_string(), 1987)]),
            ),
        ]);
        assert_eq!(out, expected);
    }

    #[test]
    fn every_outer_key_has_a_source_record() {
        let cars = RecordSet::sample();
        let out = cars
            .seq()
            .group_by_then_project(|car| car.category(), |car| car.model(), |car| car.attribute())
            .unwrap();

        for (category, inner) in &out {
            assert!(cars.iter().any(|car| car.category() == *category));
            assert!(!inner.is_empty());
        }
        assert_eq!(out["suv"].len(), 5);
    }

    #[test]
    fn duplicate_inner_key_is_rejected_by_default() {
        let cars = RecordSet::new(vec![
            Record::new("suv", "Ford", "Ranger", 1996),
            Record::new("sedan", "BMW", "530", 1998),
            Record::new("suv", "Ford", "Explorer", 2300),
        ]);
        let err = group_by_then_project(
            &cars,
            |car| car.category().to_string(),
            |car| car.manufacturer().to_string(),
            |car| car.attribute(),
        )
        .unwrap_err();

        match &err {
            PipelineError::DuplicateKey { group, key } => {
                assert_eq!(group, "suv");
                assert_eq!(key, "Ford");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(err.to_string(), "duplicate key 'Ford' in group 'suv'");
    }

    #[test]
    fn same_inner_key_in_different_groups_is_allowed() {
        let cars = RecordSet::new(vec![
            Record::new("suv", "BMW", "X5", 2998),
            Record::new("sedan", "BMW", "530", 1998),
        ]);
        let out = group_by_then_project(
            &cars,
            |car| car.category(),
            |car| car.manufacturer(),
            |car| car.model(),
        )
        .unwrap();
        assert_eq!(out["suv"]["BMW"], "X5");
        assert_eq!(out["sedan"]["BMW"], "530");
    }

    #[test]
    fn last_write_wins_keeps_the_later_value() {
        let cars = RecordSet::new(vec![
            Record::new("suv", "Ford", "Ranger", 1996),
            Record::new("suv", "Ford", "Explorer", 2300),
        ]);
        let out = cars
            .seq()
            .group_by_then_project_with(
                DuplicateKeyPolicy::LastWriteWins,
                |car| car.category(),
                |car| car.manufacturer(),
                |car| car.attribute(),
            )
            .unwrap();
        assert_eq!(out["suv"]["Ford"], 2300);
    }

    #[test]
    fn group_by_keeps_input_order_within_buckets() {
        let cars = RecordSet::sample();
        let out = group_by(&cars, |car| car.category());

        assert_eq!(out.len(), 2);
        let sedans: Vec<&str> = out["sedan"].iter().map(|car| car.manufacturer()).collect();
        assert_eq!(sedans, vec!["BMW", "Mercedes", "Audi"]);
        assert_eq!(out["suv"].len(), 5);
    }

    #[test]
    fn group_by_then_project_over_empty_record_set_is_empty() {
        let cars = RecordSet::new(Vec::new());
        let out = group_by_then_project(
            &cars,
            |car| car.category(),
            |car| car.manufacturer(),
            |car| car.attribute(),
        )
        .unwrap();
        assert!(out.is_empty());
        assert!(group_by(&cars, |car| car.category()).is_empty());
    }
}
