//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::classifier::CategoryScore;
use crate::cli::args::{DocclassArgs, OutputFormat};
use crate::error::Result;
use crate::ranking::RankedFeature;

/// Result of training one or more items.
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainingResult {
    pub user: String,
    pub items_trained: usize,
    pub items_skipped: usize,
    pub duration_ms: u64,
}

/// Result of a classification.
#[derive(Debug, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub user: String,
    pub algorithm: String,
    pub category: String,
    pub is_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<Vec<CategoryScore>>,
}

/// Liking ranking of a user's features.
#[derive(Debug, Serialize, Deserialize)]
pub struct RankingResult {
    pub user: String,
    pub features: Vec<RankedFeature>,
}

/// Count statistics of a user.
#[derive(Debug, Serialize, Deserialize)]
pub struct StoreStats {
    pub user: String,
    pub total_items: f64,
    pub vocabulary_size: usize,
    pub categories: Vec<CategoryStats>,
}

/// Per-category statistics.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: String,
    pub items: f64,
    pub features: usize,
}

/// Something that can print itself for humans.
pub trait HumanOutput {
    fn render_human(&self, args: &DocclassArgs);
}

/// Output a result in the specified format.
pub fn output_result<T>(message: &str, result: &T, args: &DocclassArgs) -> Result<()>
where
    T: Serialize + HumanOutput,
{
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 1 {
                println!("{message}");
                println!();
            }
            result.render_human(args);
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &DocclassArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}

impl HumanOutput for TrainingResult {
    fn render_human(&self, args: &DocclassArgs) {
        if args.verbosity() == 0 {
            return;
        }
        println!(
            "Trained {} item(s) for '{}' in {}ms",
            self.items_trained, self.user, self.duration_ms
        );
        if self.items_skipped > 0 {
            println!("Skipped {} invalid line(s)", self.items_skipped);
        }
    }
}

impl HumanOutput for ClassificationResult {
    fn render_human(&self, args: &DocclassArgs) {
        println!("{}", self.category);

        if let Some(scores) = &self.scores {
            println!();
            println!("Scores ({}):", self.algorithm);
            println!("─────────────");
            for score in scores {
                let accepted = !self.is_default && score.category == self.category;
                let marker = if accepted { "*" } else { " " };
                println!("{marker} {:<20} {:>12.6}", score.category, score.score);
            }
        } else if args.verbosity() > 1 && self.is_default {
            println!("(no category accepted; default returned)");
        }
    }
}

impl HumanOutput for RankingResult {
    fn render_human(&self, args: &DocclassArgs) {
        if args.verbosity() > 0 {
            println!("Liking ranking for '{}':", self.user);
            println!("═══════════════════");
        }
        if self.features.is_empty() {
            println!("No features recorded.");
            return;
        }
        for (rank, feature) in self.features.iter().enumerate() {
            println!("{:>4}. {:<20} {:>8.1}", rank + 1, feature.feature, feature.liking);
        }
    }
}

impl HumanOutput for StoreStats {
    fn render_human(&self, _args: &DocclassArgs) {
        println!("Count Statistics for '{}':", self.user);
        println!("═══════════════════════");
        println!("Trained items: {}", self.total_items);
        println!("Distinct features: {}", self.vocabulary_size);

        if !self.categories.is_empty() {
            println!();
            println!("Categories:");
            println!("───────────");
            for category in &self.categories {
                println!(
                    "  {:<20} items: {:<8} features: {}",
                    category.category, category.items, category.features
                );
            }
        }
    }
}
