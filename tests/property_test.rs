use std::sync::Arc;

use docclass::classifier::{Classifier, invchi2};
use docclass::store::{CountStore, MemoryCountStore};
use proptest::prelude::*;

proptest! {
    #[test]
    fn invchi2_of_zero_is_one(half_dof in 1usize..200) {
        prop_assert_eq!(invchi2(0.0, half_dof * 2).unwrap(), 1.0);
    }

    #[test]
    fn invchi2_is_a_probability(chi in 0.0f64..2000.0, half_dof in 1usize..200) {
        let p = invchi2(chi, half_dof * 2).unwrap();
        prop_assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn invchi2_is_non_increasing(
        a in 0.0f64..500.0,
        delta in 0.0f64..500.0,
        half_dof in 1usize..100,
    ) {
        let dof = half_dof * 2;
        let lower = invchi2(a, dof).unwrap();
        let higher = invchi2(a + delta, dof).unwrap();
        prop_assert!(higher <= lower + 1e-12, "{} > {}", higher, lower);
    }

    #[test]
    fn invchi2_rejects_odd_dof(chi in 0.0f64..100.0, half_dof in 0usize..100) {
        prop_assert!(invchi2(chi, half_dof * 2 + 1).is_err());
    }

    #[test]
    fn training_twice_doubles_counts(
        words in prop::collection::vec("[a-z]{3,10}", 1..8),
        category in "[a-z]{1,8}",
    ) {
        let item = words.join(" ");

        let once = MemoryCountStore::new("once");
        Classifier::new(Arc::new(once.clone())).train(&item, &category).unwrap();

        let twice = MemoryCountStore::new("twice");
        let base = Classifier::new(Arc::new(twice.clone()));
        base.train(&item, &category).unwrap();
        base.train(&item, &category).unwrap();

        prop_assert_eq!(
            twice.get_category_count(&category).unwrap(),
            2.0 * once.get_category_count(&category).unwrap()
        );
        for row in once.feature_counts().unwrap() {
            prop_assert_eq!(
                twice.get_feature_count(&row.feature, &row.category).unwrap(),
                2.0 * row.count
            );
        }
    }

    #[test]
    fn unseen_feature_gets_assumed_probability(
        basic in 0.0f64..=1.0,
        weight in 1e-6f64..=10.0,
        assumed_prob in 0.0f64..=1.0,
    ) {
        let store = MemoryCountStore::new("prior");
        let base = Classifier::new(Arc::new(store));
        base.train("quick brown fox", "good").unwrap();

        prop_assert_eq!(base.weighted_prob("zebra", basic).unwrap(), 0.5);
        prop_assert_eq!(
            base.weighted_prob_with("zebra", basic, weight, assumed_prob).unwrap(),
            assumed_prob
        );
    }

    #[test]
    fn weighted_prob_stays_between_prior_and_observation(
        basic in 0.0f64..=1.0,
        weight in 1e-6f64..=10.0,
        assumed_prob in 0.0f64..=1.0,
    ) {
        let store = MemoryCountStore::new("prior");
        let base = Classifier::new(Arc::new(store));
        base.train("quick brown fox", "good").unwrap();
        base.train("quick money", "bad").unwrap();

        let p = base.weighted_prob_with("quick", basic, weight, assumed_prob).unwrap();
        let (low, high) = if basic < assumed_prob { (basic, assumed_prob) } else { (assumed_prob, basic) };
        prop_assert!(p >= low - 1e-12 && p <= high + 1e-12, "{} outside [{}, {}]", p, low, high);
    }
}
