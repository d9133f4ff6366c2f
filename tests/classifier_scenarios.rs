use std::sync::Arc;

use docclass::classifier::{
    Classifier, ComplementNaiveBayesClassifier, DocumentClassifier, FisherClassifier,
    NaiveBayesClassifier,
};
use docclass::config::{Algorithm, ClassifierConfig};
use docclass::error::DocclassError;
use docclass::features::{FeatureSet, FnFeatureExtractor};
use docclass::store::{CountStore, MemoryCountStore};

fn sample_train(classifier: &dyn DocumentClassifier) {
    classifier.train("Nobody owns the water.", "good").unwrap();
    classifier
        .train("the quick rabbit jumps fences", "good")
        .unwrap();
    classifier.train("buy pharmaceuticals now", "bad").unwrap();
    classifier
        .train("make quick money in the online casino", "bad")
        .unwrap();
    classifier.train("the quick brown fox jumps", "good").unwrap();
}

fn build(algorithm: Algorithm) -> Box<dyn DocumentClassifier> {
    let store = Arc::new(MemoryCountStore::new("scenario"));
    ClassifierConfig::for_algorithm(algorithm)
        .build(store)
        .unwrap()
}

#[test]
fn test_quick_money_is_bad() {
    for algorithm in [Algorithm::NaiveBayes, Algorithm::Fisher] {
        let classifier = build(algorithm);
        sample_train(classifier.as_ref());

        assert_eq!(
            classifier.classify("quick money", "unknown").unwrap(),
            "bad",
            "{algorithm}"
        );
    }
}

#[test]
fn test_rabbit_is_never_bad() {
    for algorithm in Algorithm::ALL {
        let classifier = build(algorithm);
        sample_train(classifier.as_ref());

        let category = classifier.classify("rabbit", "unknown").unwrap();
        assert!(
            category == "good" || category == "unknown",
            "{algorithm} classified rabbit as {category}"
        );
    }
}

#[test]
fn test_untrained_classify_fails_for_every_algorithm() {
    for algorithm in Algorithm::ALL {
        let classifier = build(algorithm);
        let err = classifier.classify("quick money", "unknown").unwrap_err();
        assert!(
            matches!(err, DocclassError::InvalidState(_)),
            "{algorithm}: {err}"
        );
    }
}

#[test]
fn test_separated_vocabularies() {
    let sports = [
        "striker scores late goal in derby",
        "goalkeeper saves penalty in derby",
        "coach praises striker after league win",
        "league table tight after derby goal",
    ];
    let cooking = [
        "simmer the garlic sauce gently",
        "knead dough then bake bread",
        "whisk eggs into the garlic sauce",
        "bake bread with rosemary and garlic",
    ];

    for algorithm in Algorithm::ALL {
        let classifier = build(algorithm);
        for (s, c) in sports.iter().zip(cooking.iter()) {
            classifier.train(s, "sports").unwrap();
            classifier.train(c, "cooking").unwrap();
        }

        assert_eq!(
            classifier.classify("late derby goal", "unknown").unwrap(),
            "sports",
            "{algorithm}"
        );
        assert_eq!(
            classifier.classify("garlic bread sauce", "unknown").unwrap(),
            "cooking",
            "{algorithm}"
        );
    }
}

#[test]
fn test_naive_bayes_tie_goes_to_first_category() {
    let classifier = build(Algorithm::NaiveBayes);
    classifier.train("shared words only", "beta").unwrap();
    classifier.train("shared words only", "alpha").unwrap();

    assert_eq!(
        classifier.classify("shared words", "unknown").unwrap(),
        "alpha"
    );
}

#[test]
fn test_naive_bayes_threshold_demands_margin() {
    let store = Arc::new(MemoryCountStore::new("threshold"));
    let mut classifier = NaiveBayesClassifier::new(Classifier::new(store));
    sample_train(&classifier);

    classifier.set_threshold("bad", 3.0).unwrap();
    assert_eq!(
        classifier.classify("quick money", "unknown").unwrap(),
        "unknown"
    );

    // A clear-cut item still clears the threshold.
    assert_eq!(
        classifier
            .classify("buy pharmaceuticals online casino", "unknown")
            .unwrap(),
        "bad"
    );
}

#[test]
fn test_fisher_minimum_falls_back_to_runner_up() {
    let store = Arc::new(MemoryCountStore::new("minimum"));
    let mut classifier = FisherClassifier::new(Classifier::new(store));
    sample_train(&classifier);

    classifier.set_minimum("bad", 0.8).unwrap();
    assert_eq!(
        classifier.classify("quick money", "unknown").unwrap(),
        "good"
    );

    classifier.set_minimum("good", 0.9).unwrap();
    assert_eq!(
        classifier.classify("quick money", "unknown").unwrap(),
        "unknown"
    );
    assert_eq!(classifier.decide("quick money").unwrap(), None);
    // A default that names a category is still a fallback.
    assert_eq!(classifier.classify("quick money", "good").unwrap(), "good");
}

#[test]
fn test_decide_names_the_accepted_category() {
    for algorithm in [Algorithm::NaiveBayes, Algorithm::Fisher] {
        let classifier = build(algorithm);
        sample_train(classifier.as_ref());

        assert_eq!(
            classifier.decide("quick money").unwrap().as_deref(),
            Some("bad"),
            "{algorithm}"
        );
    }
}

#[test]
fn test_complement_picks_highest_log_ratio() {
    // The winner is the category with the largest ln Pr(cat) - ln Pr(item | not cat).
    let store = Arc::new(MemoryCountStore::new("complement"));
    let classifier = ComplementNaiveBayesClassifier::new(Classifier::new(store));
    sample_train(&classifier);

    let scores = classifier.scores("quick money").unwrap();
    let bad = scores.iter().find(|s| s.category == "bad").unwrap().score;
    let good = scores.iter().find(|s| s.category == "good").unwrap().score;

    assert!(bad > good);
    assert!(bad > 0.0);
    assert_eq!(
        classifier.classify("quick money", "unknown").unwrap(),
        "bad"
    );
}

#[test]
fn test_scores_follow_category_order() {
    for algorithm in Algorithm::ALL {
        let classifier = build(algorithm);
        sample_train(classifier.as_ref());

        let categories: Vec<String> = classifier
            .scores("quick rabbit")
            .unwrap()
            .into_iter()
            .map(|s| s.category)
            .collect();
        assert_eq!(categories, vec!["bad", "good"], "{algorithm}");
    }
}

#[test]
fn test_custom_extractor() {
    let store = Arc::new(MemoryCountStore::new("custom"));
    let extractor = FnFeatureExtractor::new("comma", |item: &str| -> FeatureSet {
        item.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    });
    let base = Classifier::with_extractor(store.clone(), Arc::new(extractor));
    let classifier = NaiveBayesClassifier::new(base);

    classifier.train("red, round, sweet", "apple").unwrap();
    classifier.train("yellow, long, sweet", "banana").unwrap();

    assert_eq!(store.get_feature_count("round", "apple").unwrap(), 1.0);
    assert_eq!(store.get_feature_count("sweet", "banana").unwrap(), 1.0);
    assert_eq!(classifier.classify("long, yellow", "unknown").unwrap(), "banana");
}

#[test]
fn test_scoped_stores_do_not_share_counts() {
    let alice_store = MemoryCountStore::new("alice");
    let bob_store = alice_store.scoped("bob");

    let alice = NaiveBayesClassifier::new(Classifier::new(Arc::new(alice_store)));
    let bob = NaiveBayesClassifier::new(Classifier::new(Arc::new(bob_store)));

    alice.train("online casino money", "bad").unwrap();
    alice.train("garden flowers", "good").unwrap();

    assert_eq!(alice.classify("casino", "unknown").unwrap(), "bad");
    assert!(bob.classify("casino", "unknown").unwrap_err().is_untrained());
}
