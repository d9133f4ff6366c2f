//! Criterion benchmarks for docclass.
//!
//! Covers feature extraction, training, and classification with each
//! algorithm over the in-memory store.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use docclass::classifier::{Classifier, DocumentClassifier};
use docclass::config::{Algorithm, ClassifierConfig};
use docclass::features::{FeatureExtractor, WordFeatureExtractor};
use docclass::store::MemoryCountStore;

/// Generate test documents for benchmarking.
fn generate_test_documents(count: usize) -> Vec<(String, &'static str)> {
    let words = [
        "quick", "rabbit", "fences", "water", "brown", "jumps", "garden", "flowers", "river",
        "money", "casino", "online", "pharmaceuticals", "cheap", "offer", "winner", "prize",
        "click", "discount", "bonus",
    ];

    let mut documents = Vec::with_capacity(count);
    for i in 0..count {
        let doc_length = 5 + (i % 20);
        let mut doc_words = Vec::with_capacity(doc_length);

        // First half of the vocabulary leans "good", second half "bad".
        let category = if i % 2 == 0 { "good" } else { "bad" };
        let offset = if category == "good" { 0 } else { words.len() / 2 };

        for j in 0..doc_length {
            let word_idx = offset + (i * 7 + j * 13) % (words.len() / 2); // Pseudo-random distribution
            doc_words.push(words[word_idx]);
        }

        documents.push((doc_words.join(" "), category));
    }

    documents
}

/// Benchmark feature extraction.
fn bench_feature_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("feature_extraction");

    let extractor = WordFeatureExtractor::new();
    let documents = generate_test_documents(100);

    group.throughput(Throughput::Elements(documents.len() as u64));
    group.bench_function("extract_batch", |b| {
        b.iter(|| {
            for (text, _) in &documents {
                let features = extractor.extract(black_box(text));
                let _ = black_box(features);
            }
        })
    });

    group.finish();
}

/// Benchmark training into a fresh store.
fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("training");

    let documents = generate_test_documents(500);

    group.throughput(Throughput::Elements(documents.len() as u64));
    group.bench_function("train_memory_store", |b| {
        b.iter_with_setup(
            || Classifier::new(Arc::new(MemoryCountStore::new("bench"))),
            |classifier| {
                for (text, category) in &documents {
                    classifier.train(black_box(text), category).unwrap();
                }
                black_box(classifier);
            },
        )
    });

    group.finish();
}

/// Benchmark classification with each algorithm.
fn bench_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("classification");

    let documents = generate_test_documents(500);
    let queries = generate_test_documents(50);

    for algorithm in Algorithm::ALL {
        let store = Arc::new(MemoryCountStore::new("bench"));
        let classifier = ClassifierConfig::for_algorithm(algorithm)
            .build(store)
            .unwrap();
        for (text, category) in &documents {
            classifier.train(text, category).unwrap();
        }

        group.throughput(Throughput::Elements(queries.len() as u64));
        group.bench_function(format!("classify_{algorithm}"), |b| {
            b.iter(|| {
                for (text, _) in &queries {
                    let category = classifier.classify(black_box(text), "unknown");
                    let _ = black_box(category);
                }
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_feature_extraction,
    bench_training,
    bench_classification
);
criterion_main!(benches);
