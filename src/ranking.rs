//! Feature ranking by accumulated liking.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::choice::LikingChoice;
use crate::error::Result;
use crate::store::CountStore;

/// A feature with its accumulated liking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFeature {
    pub feature: String,
    /// Sum of `count * weight(category)` over the feature's rows.
    pub liking: f64,
}

/// Rank every feature of the store's scope by liking, most disliked first.
///
/// Each (feature, category) row contributes `count * weight(category)`, where
/// the category must be a [`LikingChoice`] key. Features with equal liking are
/// ordered by name.
///
/// # Errors
///
/// Fails with `InvalidChoice` when a row's category is not a liking choice.
pub fn liking_ranking(store: &dyn CountStore) -> Result<Vec<RankedFeature>> {
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();

    for row in store.feature_counts()? {
        let choice: LikingChoice = row.category.parse()?;
        *totals.entry(row.feature).or_insert(0.0) += row.count * f64::from(choice.weight());
    }

    let mut ranking: Vec<RankedFeature> = totals
        .into_iter()
        .map(|(feature, liking)| RankedFeature { feature, liking })
        .collect();
    // BTreeMap order already breaks ties by name; the sort is stable.
    ranking.sort_by(|a, b| a.liking.total_cmp(&b.liking));

    Ok(ranking)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DocclassError;
    use crate::store::MemoryCountStore;

    fn ranked(store: &MemoryCountStore) -> Vec<(String, f64)> {
        liking_ranking(store)
            .unwrap()
            .into_iter()
            .map(|r| (r.feature, r.liking))
            .collect()
    }

    #[test]
    fn test_liking_ranking() {
        let store = MemoryCountStore::new("alice");
        for (feature, category, times) in [
            ("kind", "like", 3),
            ("kind", "unlike", 1),
            ("loud", "unlike", 2),
            ("quiet", "soso", 4),
            ("brave", "like", 1),
        ] {
            for _ in 0..times {
                store.increment_feature_count(feature, category).unwrap();
            }
        }

        assert_eq!(
            ranked(&store),
            vec![
                ("loud".to_string(), -2.0),
                ("quiet".to_string(), 0.0),
                ("brave".to_string(), 1.0),
                ("kind".to_string(), 2.0),
            ]
        );
    }

    #[test]
    fn test_ties_ordered_by_name() {
        let store = MemoryCountStore::new("alice");
        store.increment_feature_count("zeta", "like").unwrap();
        store.increment_feature_count("alpha", "like").unwrap();

        let features: Vec<String> = ranked(&store).into_iter().map(|(f, _)| f).collect();
        assert_eq!(features, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_empty_store() {
        let store = MemoryCountStore::new("alice");
        assert!(liking_ranking(&store).unwrap().is_empty());
    }

    #[test]
    fn test_non_liking_category_fails() {
        let store = MemoryCountStore::new("alice");
        store.increment_feature_count("casino", "bad").unwrap();

        let err = liking_ranking(&store).unwrap_err();
        assert!(matches!(err, DocclassError::InvalidChoice(_)));
    }
}
