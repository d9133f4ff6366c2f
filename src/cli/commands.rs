//! Command implementations for the docclass CLI.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::{info, warn};

use crate::classifier::{Classifier, DocumentClassifier};
use crate::cli::args::*;
use crate::cli::output::*;
use crate::config::ClassifierConfig;
use crate::ranking::liking_ranking;
use crate::store::{CountStore, FileCountStore, FileStoreConfig};

/// One line of a batch training file.
#[derive(Debug, Deserialize)]
struct BatchRecord {
    item: String,
    category: String,
}

/// Execute a CLI command.
pub fn execute_command(args: DocclassArgs) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train(train_args, &args),
        Command::TrainBatch(batch_args) => train_batch(batch_args, &args),
        Command::Classify(classify_args) => classify(classify_args, &args),
        Command::Ranking(ranking_args) => ranking(ranking_args, &args),
        Command::Stats(stats_args) => show_stats(stats_args, &args),
    }
}

/// Open the file store of the requested user.
fn open_store(args: &StoreArgs) -> Result<Arc<FileCountStore>> {
    let config = FileStoreConfig::new(&args.store_dir).with_sync_writes(args.sync);
    let store = FileCountStore::open(config, &args.user).with_context(|| {
        format!(
            "failed to open counts of '{}' in {}",
            args.user,
            args.store_dir.display()
        )
    })?;
    Ok(Arc::new(store))
}

/// Load a configuration file, or the defaults.
fn load_config(path: Option<&Path>) -> Result<ClassifierConfig> {
    match path {
        Some(path) => ClassifierConfig::from_file(path)
            .with_context(|| format!("failed to load configuration {}", path.display())),
        None => Ok(ClassifierConfig::default()),
    }
}

/// Build a training base using the configured extractor.
fn training_base(store: Arc<FileCountStore>, config: &ClassifierConfig) -> Result<Classifier> {
    let extractor = config
        .extractor
        .build()
        .context("invalid extractor configuration")?;
    Ok(Classifier::with_extractor(store, Arc::new(extractor)).with_smoothing(config.smoothing))
}

/// Train one item.
fn train(args: &TrainArgs, cli_args: &DocclassArgs) -> Result<()> {
    let start_time = Instant::now();
    let config = load_config(args.config.as_deref())?;
    let store = open_store(&args.store)?;
    let base = training_base(store, &config)?;

    base.train(&args.text, &args.category)
        .with_context(|| format!("failed to train category '{}'", args.category))?;

    output_result(
        "Item trained",
        &TrainingResult {
            user: args.store.user.clone(),
            items_trained: 1,
            items_skipped: 0,
            duration_ms: start_time.elapsed().as_millis() as u64,
        },
        cli_args,
    )?;

    Ok(())
}

/// Train every record of a JSON Lines file.
fn train_batch(args: &TrainBatchArgs, cli_args: &DocclassArgs) -> Result<()> {
    let start_time = Instant::now();
    let config = load_config(args.config.as_deref())?;
    let store = open_store(&args.store)?;
    let base = training_base(store, &config)?;

    let file = File::open(&args.file)
        .with_context(|| format!("failed to open {}", args.file.display()))?;
    let reader = BufReader::new(file);

    let mut trained = 0;
    let mut skipped = 0;

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", line_num + 1))?;
        if line.trim().is_empty() {
            continue;
        }

        let record = match serde_json::from_str::<BatchRecord>(&line) {
            Ok(record) if !record.category.is_empty() => record,
            Ok(_) if args.skip_invalid => {
                warn!(line = line_num + 1, "skipping record with empty category");
                skipped += 1;
                continue;
            }
            Ok(_) => bail!("line {}: category must not be empty", line_num + 1),
            Err(e) if args.skip_invalid => {
                warn!(line = line_num + 1, error = %e, "skipping malformed record");
                skipped += 1;
                continue;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("line {} is not a valid record", line_num + 1));
            }
        };

        base.train(&record.item, &record.category)
            .with_context(|| format!("failed to train line {}", line_num + 1))?;
        trained += 1;

        if trained % 1000 == 0 {
            info!(trained, "batch training progress");
        }
    }

    output_result(
        "Batch trained",
        &TrainingResult {
            user: args.store.user.clone(),
            items_trained: trained,
            items_skipped: skipped,
            duration_ms: start_time.elapsed().as_millis() as u64,
        },
        cli_args,
    )?;

    Ok(())
}

/// Classify one item.
fn classify(args: &ClassifyArgs, cli_args: &DocclassArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(algorithm) = args.algorithm {
        config.algorithm = algorithm;
    }

    let store = open_store(&args.store)?;
    let classifier = config.build(store)?;

    let result = classification_result(
        classifier.as_ref(),
        &args.store.user,
        &args.text,
        &args.default,
        args.scores,
    )?;
    output_result("Classification", &result, cli_args)?;

    Ok(())
}

/// Decide the category of `text`, falling back to `default`.
fn classification_result(
    classifier: &dyn DocumentClassifier,
    user: &str,
    text: &str,
    default: &str,
    with_scores: bool,
) -> Result<ClassificationResult> {
    let decision = classifier.decide(text).map_err(|e| {
        if e.is_untrained() {
            anyhow::anyhow!("nothing has been trained for '{user}' yet; run `docclass train` first")
        } else {
            anyhow::Error::new(e).context("classification failed")
        }
    })?;

    let scores = if with_scores {
        Some(classifier.scores(text)?)
    } else {
        None
    };

    Ok(ClassificationResult {
        user: user.to_string(),
        algorithm: classifier.name().to_string(),
        is_default: decision.is_none(),
        category: decision.unwrap_or_else(|| default.to_string()),
        scores,
    })
}

/// Show the liking ranking.
fn ranking(args: &RankingArgs, cli_args: &DocclassArgs) -> Result<()> {
    let store = open_store(&args.store)?;
    let mut features = liking_ranking(store.as_ref())
        .context("counts contain categories that are not liking choices")?;

    if let Some(limit) = args.limit {
        features.truncate(limit);
    }

    output_result(
        "Ranking",
        &RankingResult {
            user: args.store.user.clone(),
            features,
        },
        cli_args,
    )?;

    Ok(())
}

/// Show count statistics.
fn show_stats(args: &StatsArgs, cli_args: &DocclassArgs) -> Result<()> {
    let store = open_store(&args.store)?;
    let stats = collect_stats(store.as_ref())?;
    output_result("Statistics", &stats, cli_args)?;
    Ok(())
}

fn collect_stats(store: &dyn CountStore) -> Result<StoreStats> {
    let rows = store.feature_counts()?;

    let mut vocabulary = BTreeSet::new();
    let mut per_category: BTreeMap<String, usize> = BTreeMap::new();
    for row in &rows {
        vocabulary.insert(row.feature.as_str());
        *per_category.entry(row.category.clone()).or_insert(0) += 1;
    }

    let categories = store
        .categories()?
        .into_iter()
        .map(|category| {
            Ok(CategoryStats {
                items: store.get_category_count(&category)?,
                features: per_category.get(&category).copied().unwrap_or(0),
                category,
            })
        })
        .collect::<crate::error::Result<Vec<_>>>()?;

    Ok(StoreStats {
        user: store.scope().to_string(),
        total_items: store.total_count()?,
        vocabulary_size: vocabulary.len(),
        categories,
    })
}
