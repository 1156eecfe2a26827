//! twinfind - Multi-strategy duplicate detection over file listings.
//!
//! Usage:
//!   twinfind detect RECORDS.json     Find duplicate groups in a listing
//!   twinfind methods                 List detection methods
//!   twinfind --help                  Show help

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, OptionExt, Result};
use strum::IntoEnumIterator;
use tracing_subscriber::EnvFilter;

use twinfind_analyze::{
    DetectionSummary, KeepPolicy, MethodSelection, SelectionPlan, select_keepers,
};
use twinfind_core::{DetectionConfig, DetectionMethod, DuplicateGroup, FileRecord};
use twinfind_ops::{
    DeletionResult, DetectionEvent, Dispatcher, DryRunProvider, FileListing, JsonListing,
    deletion_targets, start_deletion, start_detection,
};

#[derive(Parser)]
#[command(
    name = "twinfind",
    version,
    about = "Find likely-duplicate files in a file listing",
    long_about = "twinfind groups file records that look like duplicates: same name and \
                  size, near-identical size, similar names, or equal content hashes.\n\n\
                  Records are read from JSON; nothing on disk is touched."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find duplicate groups
    Detect {
        /// JSON file (or directory of JSON files) holding file records
        records: PathBuf,

        /// Detection methods, in order (e.g. "exact,size")
        #[arg(short, long, value_delimiter = ',')]
        methods: Vec<String>,

        /// TOML file with detection settings
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Pick a keeper in every group (newest, oldest, largest, smallest)
        #[arg(short, long)]
        keep: Option<KeepPolicy>,

        /// With --keep, walk the deletion plan without deleting anything
        #[arg(long, requires = "keep")]
        dry_run: bool,

        /// Never use a worker thread
        #[arg(long)]
        inline: bool,
    },

    /// List detection methods
    Methods,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Detect {
            records,
            methods,
            config,
            format,
            keep,
            dry_run,
            inline,
        } => {
            run_detect(&records, &methods, config.as_deref(), format, keep, dry_run, inline)
                .await?;
        }
        Command::Methods => run_methods(),
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load detection settings, falling back to defaults.
fn load_config(path: Option<&Path>) -> Result<DetectionConfig> {
    let Some(path) = path else {
        return Ok(DetectionConfig::default());
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = DetectionConfig::from_toml_str(&contents)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    tracing::debug!(?config, "Loaded configuration");
    Ok(config)
}

async fn load_records(path: &Path) -> Result<Vec<FileRecord>> {
    let folder = path.to_str().ok_or_eyre("Records path is not valid UTF-8")?;
    let root = std::env::current_dir().context("Invalid working directory")?;
    let records = JsonListing::new(root).list(folder).await?;
    Ok(records)
}

/// Run duplicate detection.
async fn run_detect(
    path: &Path,
    methods: &[String],
    config: Option<&Path>,
    format: OutputFormat,
    keep: Option<KeepPolicy>,
    dry_run: bool,
    inline: bool,
) -> Result<()> {
    let config = load_config(config)?;
    let records = load_records(path).await?;
    let methods = MethodSelection::from_names(methods);

    let mut dispatcher = Dispatcher::new(config);
    if inline {
        dispatcher = dispatcher.inline_only();
    }

    eprintln!("Analyzing {} records ({})...", records.len(), methods);

    let (_handle, mut events) = start_detection(dispatcher, records, methods);
    let mut groups = Vec::new();
    while let Some(event) = events.recv().await {
        match event {
            DetectionEvent::Progress(progress) => {
                eprint!("\r\x1b[K[{:>3.0}%] {}", progress.percentage(), progress.message);
                let _ = std::io::stderr().flush();
            }
            DetectionEvent::Complete(found) => groups = found,
            DetectionEvent::Failed(err) => {
                eprintln!();
                return Err(err).context("Detection failed");
            }
        }
    }
    eprintln!();

    let summary = DetectionSummary::from_groups(&groups);
    let plan = keep.map(|policy| select_keepers(&groups, policy));

    match format {
        OutputFormat::Text => print_text(&summary, &groups, plan.as_ref()),
        OutputFormat::Json => {
            let report = serde_json::json!({
                "summary": summary,
                "groups": groups,
                "plan": plan,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    if dry_run && let Some(plan) = &plan {
        run_dry_deletion(plan).await;
    }

    Ok(())
}

fn print_text(summary: &DetectionSummary, groups: &[DuplicateGroup], plan: Option<&SelectionPlan>) {
    println!();
    println!("{}", "─".repeat(70));
    println!(" Duplicate Report");
    println!("{}", "─".repeat(70));
    println!();

    if summary.is_empty() {
        println!(" No duplicate files found.");
        return;
    }

    println!(
        " Found {} groups ({} files, {} in groups)",
        summary.group_count,
        summary.distinct_records,
        format_size(summary.total_bytes)
    );
    for (method, count) in &summary.groups_by_method {
        println!("   {:<14} {}", method.label(), count);
    }
    println!();

    for (i, group) in groups.iter().enumerate() {
        println!(
            " Group {} [{}] ({} files, {})",
            i + 1,
            group.method,
            group.count(),
            format_size(group.total_size)
        );

        let selection = plan.map(|p| &p.selections[i]);
        for member in &group.members {
            let mark = match selection {
                Some(s) if s.keeper.id == member.id => "keep",
                Some(_) => "del ",
                None => "    ",
            };
            println!(
                "   {} {:<12} {:<40} {:>10}  {}",
                mark,
                truncate(member.id.as_str(), 12),
                truncate(&member.name, 40),
                format_size(member.size),
                member.last_modified.format("%Y-%m-%d %H:%M")
            );
        }
        println!();
    }

    if let Some(plan) = plan {
        println!(
            " Keeping {} ({}): {} files to delete, {} reclaimable",
            plan.policy,
            plan.selections.len(),
            plan.deletion_ids().len(),
            format_size(plan.reclaimable_bytes())
        );
    }
}

async fn run_dry_deletion(plan: &SelectionPlan) {
    let mut rx = start_deletion(Arc::new(DryRunProvider), deletion_targets(plan));
    while let Some(result) = rx.recv().await {
        if let DeletionResult::Complete(complete) = result {
            println!(
                " Dry run: {}, {} would be freed",
                complete.summary(),
                format_size(complete.bytes_freed)
            );
        }
    }
}

fn run_methods() {
    for method in DetectionMethod::iter() {
        let default = if DetectionMethod::DEFAULTS.contains(&method) {
            " (default)"
        } else {
            ""
        };
        println!("{:<8} {}{}", method.to_string(), method.label(), default);
    }
}

/// Format bytes as human-readable size.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Truncate a string to max length.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
