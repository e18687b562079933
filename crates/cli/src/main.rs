//! Command-line front end for trademark conflict checks.
//!
//! Usage:
//!     markclash compare --reference db.csv --candidates extracted.json
//!     markclash pair "Kromax" "Cromax"
//!     markclash stats --reference db.csv

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use markclash_explain::{build_report, summarize, ComparisonReport, ReportStatus, DEFAULT_MIN_SCORE};
use markclash_model::{CandidateRecord, FieldScore};
use markclash_score::{CancellationToken, Comparator, ComparatorConfig};
use markclash_store::{load_candidates, CsvReferenceSource, ReferenceSource, ReferenceStats};

#[derive(Parser)]
#[command(name = "markclash")]
#[command(about = "Score extracted trademarks against a reference database")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Comparator configuration (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Single sensitivity dial (30-95) replacing the configured tier bounds
    #[arg(long, global = true)]
    sensitivity: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare extracted candidates against a reference CSV
    Compare {
        /// Reference database CSV
        #[arg(short, long)]
        reference: PathBuf,

        /// Extraction output (JSON)
        #[arg(short, long)]
        candidates: PathBuf,

        /// Minimum composite score for a match to be reported
        #[arg(long, default_value_t = DEFAULT_MIN_SCORE)]
        min_score: f64,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show the similarity breakdown for two texts
    Pair {
        a: String,
        b: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Summarize a reference CSV
    Stats {
        /// Reference database CSV
        #[arg(short, long)]
        reference: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("markclash=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Compare {
            reference,
            candidates,
            min_score,
            format,
        } => {
            let comparator = build_comparator(cli.config.as_deref(), cli.sensitivity)?;
            run_compare(comparator, &reference, &candidates, min_score, &format).await?;
        }
        Commands::Pair { a, b, format } => {
            let comparator = build_comparator(cli.config.as_deref(), cli.sensitivity)?;
            run_pair(&comparator, &a, &b, &format)?;
        }
        Commands::Stats { reference, format } => {
            run_stats(&reference, &format)?;
        }
    }

    Ok(())
}

fn build_comparator(config_path: Option<&Path>, sensitivity: Option<f64>) -> Result<Comparator> {
    let mut config = match config_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            ComparatorConfig::from_toml_str(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => ComparatorConfig::default(),
    };

    if let Some(sensitivity) = sensitivity {
        config = config.with_sensitivity(sensitivity)?;
    }

    let bounds = config.thresholds.bounds;
    tracing::debug!(
        low = bounds.low,
        medium = bounds.medium,
        high = bounds.high,
        "Tier bounds"
    );
    Ok(Comparator::new(config)?)
}

async fn run_compare(
    comparator: Comparator,
    reference_path: &Path,
    candidates_path: &Path,
    min_score: f64,
    format: &str,
) -> Result<()> {
    let source = CsvReferenceSource::new(reference_path);
    let references = source
        .load()
        .with_context(|| format!("loading references from {}", reference_path.display()))?;
    let candidates = load_candidates(candidates_path)
        .with_context(|| format!("loading candidates from {}", candidates_path.display()))?;
    tracing::info!(
        source = source.name(),
        references = references.len(),
        candidates = candidates.len(),
        "Comparing"
    );

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling comparison");
            interrupt.cancel();
        }
    });

    let (candidates, batch) = tokio::task::spawn_blocking(move || {
        let batch = comparator.compare_batch(&candidates, &references, &cancel);
        (candidates, batch)
    })
    .await?;

    if batch.cancelled {
        bail!(
            "comparison cancelled after {} of {} candidates",
            batch.outcomes.len(),
            candidates.len()
        );
    }

    let reports: Vec<ComparisonReport> = candidates
        .iter()
        .zip(&batch.outcomes)
        .map(|(candidate, outcome)| build_report(candidate, outcome, min_score))
        .collect();

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    if !batch.skipped_references.is_empty() {
        println!(
            "Skipped {} reference rows without a trademark",
            batch.skipped_references.len()
        );
    }
    for (candidate, report) in candidates.iter().zip(&reports) {
        print_report(candidate, report);
    }

    println!("\n---");
    println!(
        "Total: {} candidates, {} with matches at or above {:.0}%",
        reports.len(),
        reports.iter().filter(|r| r.similar_trademarks_found > 0).count(),
        min_score
    );

    Ok(())
}

fn print_report(candidate: &CandidateRecord, report: &ComparisonReport) {
    println!("\n{} ({})", display_name(candidate), report.candidate_id);

    if let ReportStatus::NoComparableData { reason } = &report.status {
        println!("   No comparable data: {}", reason);
        return;
    }

    if report.matches.is_empty() {
        println!("   No similar trademarks at or above {:.0}%", report.min_score);
        return;
    }

    for (i, m) in report.matches.iter().enumerate() {
        println!(
            "   {}. {} (Application: {})",
            i + 1,
            m.result.reference_text,
            m.result.reference_id
        );
        println!("      {}", summarize(&m.result));
        if m.result.fallback_used {
            println!("      {}", m.comparison_note);
        }
    }
}

fn display_name(candidate: &CandidateRecord) -> &str {
    match candidate.name().trim() {
        "" => "<unnamed>",
        name => name,
    }
}

fn run_pair(comparator: &Comparator, a: &str, b: &str, format: &str) -> Result<()> {
    let score = comparator.compare_texts(a, b);
    let tier = comparator.classify(score.composite);

    if format == "json" {
        let output = serde_json::json!({
            "a": a,
            "b": b,
            "tier": tier,
            "level": tier.label(),
            "score": score,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("'{}' vs '{}'", a, b);
    println!("---");
    println!("Composite: {:.2}  {}", score.composite, tier.label());
    print_families(&score);
    for sub in &score.sub_scores {
        println!("   {:<16} {:>6.2}", sub.algorithm.name(), sub.value);
    }

    Ok(())
}

fn print_families(score: &FieldScore) {
    let family = |value: Option<f64>| match value {
        Some(v) => format!("{:.2}", v),
        None => "n/a".to_string(),
    };
    println!(
        "Phonetic: {} | Fuzzy: {}",
        family(score.phonetic),
        family(score.fuzzy)
    );
}

fn run_stats(reference_path: &Path, format: &str) -> Result<()> {
    let references = CsvReferenceSource::new(reference_path)
        .load()
        .with_context(|| format!("loading references from {}", reference_path.display()))?;
    let stats = ReferenceStats::from_entries(&references);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Reference set: {}", reference_path.display());
    println!("---");
    println!("Trademarks:         {}", stats.total_trademarks);
    println!("Unique applicants:  {}", stats.unique_applicants);
    println!("Missing trademark:  {}", stats.missing_trademark);
    println!(
        "Registration:       {} live, {} pending, {} dead, {} unknown",
        stats.registration.live,
        stats.registration.pending,
        stats.registration.dead,
        stats.registration.unknown
    );

    if !stats.classes.is_empty() {
        println!("\nClasses:");
        for (class, count) in &stats.classes {
            println!("   {:>3}: {}", class, count);
        }
    }
    if !stats.statuses.is_empty() {
        println!("\nStatus column:");
        for (status, count) in &stats.statuses {
            println!("   {}: {}", status, count);
        }
    }

    Ok(())
}
