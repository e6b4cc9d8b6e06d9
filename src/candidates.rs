//! Candidate index construction (C2).

use std::collections::{BTreeMap, BTreeSet};

use crate::model::TimeRange;

/// Expands each feature's optional time ranges into the `time_instant -> {feature}` mapping of
/// candidates to test. Naive expansion, acceptable per §4.3 for the instance sizes this engine
/// targets.
pub fn candidate_index(
    optional_features: &BTreeMap<String, Vec<TimeRange>>,
) -> BTreeMap<i64, BTreeSet<String>> {
    let mut index: BTreeMap<i64, BTreeSet<String>> = BTreeMap::new();
    for (feature, ranges) in optional_features {
        for &(lo, hi) in ranges {
            for t in lo..=hi {
                index.entry(t).or_default().insert(feature.clone());
            }
        }
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_overlapping_ranges() {
        let mut optional = BTreeMap::new();
        optional.insert("a".to_owned(), vec![(0, 1)]);
        optional.insert("b".to_owned(), vec![(1, 2)]);

        let index = candidate_index(&optional);

        assert_eq!(index[&0], BTreeSet::from(["a".to_owned()]));
        assert_eq!(
            index[&1],
            BTreeSet::from(["a".to_owned(), "b".to_owned()])
        );
        assert_eq!(index[&2], BTreeSet::from(["b".to_owned()]));
    }

    #[test]
    fn disjoint_ranges_for_one_feature_both_appear() {
        let mut optional = BTreeMap::new();
        optional.insert("a".to_owned(), vec![(0, 0), (5, 5)]);

        let index = candidate_index(&optional);

        assert_eq!(index.len(), 2);
        assert!(index.contains_key(&0));
        assert!(index.contains_key(&5));
    }
}
