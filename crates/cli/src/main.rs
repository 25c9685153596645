use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use fetch::endpoints::DEFAULT_BASE_URL;
use fetch::{Endpoints, HttpTransport};
use orchestrator::{
    search_media, FetchReport, NormalizeReport, Orchestrator, ReferenceRatings, ReviewProcessor,
};
use pipeline::ProgressSnapshot;
use records::paths::{
    DEFAULT_CRITICS_FILE, DEFAULT_MEDIA_FILE, DEFAULT_NORMALIZED_DIR, DEFAULT_REFERENCE_FILE,
    DEFAULT_REVIEWS_DIR,
};
use records::{JsonLinesStore, Media, RecordStore, ScoredCritic};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// critics-finder - find the critics whose taste matches yours
#[derive(Parser)]
#[command(name = "critics-finder")]
#[command(about = "Collect critic reviews and rank critics by similarity to your ratings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Flags of the commands that talk to the review site
#[derive(Args)]
struct SourceArgs {
    /// Base URL of the review site
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the critics directory and write the critics file
    Scan {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(long, default_value = DEFAULT_CRITICS_FILE)]
        out: PathBuf,
    },

    /// Preview the review history of a single critic
    Fetch {
        #[command(flatten)]
        source: SourceArgs,

        /// Critic identifier (as in /critics/<id>)
        #[arg(long)]
        critic_id: String,

        /// Number of reviews to print
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Fetch the review history of every critic in the critics file
    FetchAll {
        #[command(flatten)]
        source: SourceArgs,

        #[arg(long, default_value = DEFAULT_CRITICS_FILE)]
        critics_file: PathBuf,

        #[arg(long, default_value = DEFAULT_REVIEWS_DIR)]
        out_dir: PathBuf,

        #[arg(long, default_value = "1")]
        workers: usize,
    },

    /// Normalize fetched reviews and build the media catalog
    Normalize {
        #[arg(long, default_value = DEFAULT_REVIEWS_DIR)]
        in_dir: PathBuf,

        #[arg(long, default_value = DEFAULT_NORMALIZED_DIR)]
        out_dir: PathBuf,

        #[arg(long, default_value = DEFAULT_MEDIA_FILE)]
        media_file: PathBuf,

        #[arg(long, default_value = "1")]
        workers: usize,
    },

    /// Rank critics by distance to your reference ratings
    Score {
        #[arg(long, default_value = DEFAULT_REFERENCE_FILE)]
        reference_file: PathBuf,

        #[arg(long, default_value = DEFAULT_CRITICS_FILE)]
        critics_file: PathBuf,

        #[arg(long, default_value = DEFAULT_NORMALIZED_DIR)]
        normalized_dir: PathBuf,

        #[arg(long, default_value = "1")]
        workers: usize,

        /// Number of critics to print
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Add or replace one of your ratings
    Rate {
        /// Media url as listed by search-media
        #[arg(long)]
        media_url: String,

        /// Score in any supported notation (e.g. "4/5", "B+", "7")
        #[arg(long)]
        score: String,

        #[arg(long, default_value = DEFAULT_REFERENCE_FILE)]
        reference_file: PathBuf,
    },

    /// Remove one of your ratings
    Unrate {
        #[arg(long)]
        media_url: String,

        #[arg(long, default_value = DEFAULT_REFERENCE_FILE)]
        reference_file: PathBuf,
    },

    /// Search the media catalog by title
    SearchMedia {
        /// Title to search for (case-insensitive, exact matches first)
        #[arg(long)]
        query: String,

        #[arg(long, default_value = DEFAULT_MEDIA_FILE)]
        media_file: PathBuf,

        #[arg(long, default_value = "20")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { source, out } => handle_scan(&source, out).await?,
        Commands::Fetch {
            source,
            critic_id,
            limit,
        } => handle_fetch(&source, critic_id, limit).await?,
        Commands::FetchAll {
            source,
            critics_file,
            out_dir,
            workers,
        } => handle_fetch_all(&source, critics_file, out_dir, workers).await?,
        Commands::Normalize {
            in_dir,
            out_dir,
            media_file,
            workers,
        } => handle_normalize(in_dir, out_dir, media_file, workers).await?,
        Commands::Score {
            reference_file,
            critics_file,
            normalized_dir,
            workers,
            limit,
        } => handle_score(reference_file, critics_file, normalized_dir, workers, limit).await?,
        Commands::Rate {
            media_url,
            score,
            reference_file,
        } => handle_rate(reference_file, media_url, score)?,
        Commands::Unrate {
            media_url,
            reference_file,
        } => handle_unrate(reference_file, media_url)?,
        Commands::SearchMedia {
            query,
            media_file,
            limit,
        } => handle_search_media(media_file, query, limit)?,
    }

    Ok(())
}

fn build_orchestrator(source: &SourceArgs, workers: usize) -> Result<Orchestrator<HttpTransport>> {
    info!(base_url = %source.base_url, timeout_secs = source.timeout_secs, "Using review site");
    let transport = HttpTransport::new(Duration::from_secs(source.timeout_secs))
        .context("Failed to build HTTP client")?;
    Ok(
        Orchestrator::new(Arc::new(transport), Endpoints::new(source.base_url.clone()))
            .with_workers(workers)
            .with_progress(print_progress),
    )
}

fn build_processor(workers: usize) -> ReviewProcessor {
    ReviewProcessor::new(JsonLinesStore)
        .with_workers(workers)
        .with_progress(print_progress)
}

/// Progress line rewritten in place on stderr
fn print_progress(snapshot: ProgressSnapshot) {
    let mut stderr = std::io::stderr();
    let _ = write!(
        stderr,
        "\r[{}/{}] {:5.1}% ({} ok, {} failed)",
        snapshot.done,
        snapshot.total,
        snapshot.percent(),
        snapshot.finished,
        snapshot.failed
    );
    if snapshot.done == snapshot.total {
        let _ = writeln!(stderr);
    }
}

/// Handle the 'scan' command
async fn handle_scan(source: &SourceArgs, out: PathBuf) -> Result<()> {
    let start = Instant::now();
    let orchestrator = build_orchestrator(source, 1)?;
    let critics = orchestrator.scan_directory(&out).await?;

    println!(
        "{} Found {} critics in {:?}, written to {}",
        "✓".green(),
        critics.len(),
        start.elapsed(),
        out.display()
    );
    Ok(())
}

/// Handle the 'fetch' command
async fn handle_fetch(source: &SourceArgs, critic_id: String, limit: usize) -> Result<()> {
    let orchestrator = build_orchestrator(source, 1)?;
    let history = orchestrator.fetch_one(&critic_id).await;

    println!(
        "{}",
        format!(
            "{} reviews of '{}' over {} pages:",
            history.reviews.len(),
            critic_id,
            history.pages
        )
        .bold()
        .blue()
    );
    for review in history.reviews.iter().take(limit) {
        let score = if review.score.is_empty() {
            "-".dimmed().to_string()
        } else {
            review.score.clone()
        };
        println!("  {} {} ({})", score.cyan(), review.media_title, review.media_url);
    }
    if let Some(err) = &history.error {
        println!("{} History incomplete: {}", "✗".red(), err);
    }
    Ok(())
}

/// Handle the 'fetch-all' command
async fn handle_fetch_all(
    source: &SourceArgs,
    critics_file: PathBuf,
    out_dir: PathBuf,
    workers: usize,
) -> Result<()> {
    let start = Instant::now();
    info!(workers, critics_file = %critics_file.display(), out_dir = %out_dir.display(), "Starting fetch-all");
    let orchestrator = build_orchestrator(source, workers)?;
    let report = orchestrator.fetch_all(&critics_file, &out_dir).await?;
    print_fetch_report(&report, start.elapsed());
    Ok(())
}

/// Handle the 'normalize' command
async fn handle_normalize(
    in_dir: PathBuf,
    out_dir: PathBuf,
    media_file: PathBuf,
    workers: usize,
) -> Result<()> {
    let start = Instant::now();
    info!(workers, in_dir = %in_dir.display(), out_dir = %out_dir.display(), "Starting normalize");
    let report = build_processor(workers)
        .normalize_all(&in_dir, &out_dir, &media_file)
        .await?;
    print_normalize_report(&report, start.elapsed());
    Ok(())
}

/// Handle the 'score' command
async fn handle_score(
    reference_file: PathBuf,
    critics_file: PathBuf,
    normalized_dir: PathBuf,
    workers: usize,
    limit: usize,
) -> Result<()> {
    info!(workers, reference_file = %reference_file.display(), "Starting score");
    let ranked = build_processor(workers)
        .score(&reference_file, &critics_file, &normalized_dir)
        .await?;
    print_ranking(&ranked, limit);
    Ok(())
}

/// Handle the 'rate' command
fn handle_rate(reference_file: PathBuf, media_url: String, score: String) -> Result<()> {
    let mut reference = ReferenceRatings::load(JsonLinesStore, reference_file)
        .context("Failed to load reference ratings")?;
    let normalized = reference
        .rate(&media_url, &score)
        .with_context(|| format!("Could not classify score '{}'", score))?;
    reference.save().context("Failed to save reference ratings")?;

    println!(
        "{} Rated {} as {:.3} ({} ratings total)",
        "✓".green(),
        media_url,
        normalized,
        reference.ratings().len()
    );
    Ok(())
}

/// Handle the 'unrate' command
fn handle_unrate(reference_file: PathBuf, media_url: String) -> Result<()> {
    let mut reference = ReferenceRatings::load(JsonLinesStore, reference_file)
        .context("Failed to load reference ratings")?;
    if !reference.remove(&media_url) {
        println!("{} No rating for {}", "•".yellow(), media_url);
        return Ok(());
    }
    reference.save().context("Failed to save reference ratings")?;
    println!("{} Removed rating for {}", "✓".green(), media_url);
    Ok(())
}

/// Handle the 'search-media' command
fn handle_search_media(media_file: PathBuf, query: String, limit: usize) -> Result<()> {
    let media: Vec<Media> = JsonLinesStore.read(&media_file).with_context(|| {
        format!(
            "Failed to read media catalog {} (run normalize first)",
            media_file.display()
        )
    })?;

    let matches = search_media(&media, &query);
    if matches.is_empty() {
        println!("{} No media matching '{}'", "•".yellow(), query);
        return Ok(());
    }

    println!("{}", format!("Search results for '{}':", query).bold().blue());
    for m in matches.iter().take(limit) {
        println!("  {} {}", m.media_url.cyan(), m);
    }
    Ok(())
}

fn print_fetch_report(report: &FetchReport, elapsed: Duration) {
    println!(
        "{} Fetched {} critics ({} reviews) in {:?}",
        "✓".green(),
        report.finished,
        report.reviews_written,
        elapsed
    );
    if !report.failed.is_empty() {
        println!("{}", format!("{} critics failed:", report.failed.len()).red());
        for failed in &report.failed {
            println!("  - {}: {}", failed.critic, failed.reason);
        }
    }
}

fn print_normalize_report(report: &NormalizeReport, elapsed: Duration) {
    println!(
        "{} Normalized {} files in {:?}",
        "✓".green(),
        report.files_normalized,
        elapsed
    );
    println!("{}Normalized scores: {}", "• ".cyan(), report.normalized);
    println!("{}Empty scores: {}", "• ".cyan(), report.empty_scores);
    println!("{}Unclassified scores: {}", "• ".cyan(), report.error_scores);
    println!("{}Media in catalog: {}", "• ".cyan(), report.media_written);
    if !report.failed_files.is_empty() {
        println!("{}", format!("{} files failed:", report.failed_files.len()).red());
        for failed in &report.failed_files {
            println!("  - {}: {}", failed.path.display(), failed.reason);
        }
    }
}

/// Print the closest critics first
fn print_ranking(ranked: &[ScoredCritic], limit: usize) {
    println!("{}", "Closest critics:".bold().blue());
    for (idx, scored) in ranked.iter().take(limit).enumerate() {
        let distance = if scored.is_comparable() {
            format!("{:.4}", scored.score)
        } else {
            "no overlap".dimmed().to_string()
        };
        println!("{}. {} - {}", (idx + 1).to_string().green(), scored.critic, distance);
    }

    let comparable = ranked.iter().filter(|s| s.is_comparable()).count();
    println!(
        "{}{} of {} critics share media with your ratings",
        "• ".cyan(),
        comparable,
        ranked.len()
    );
}
