use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use nexus_dashboard::DashboardStore;
use nexus_paths::{Resolver, ResolverConfig};

#[derive(Parser)]
#[command(name = "nexus-dash")]
#[command(about = "Roadmap-index dashboard over nexus report manifests", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Repository root override (falls back to VDM_REPO_ROOT)
    #[arg(long, global = true)]
    repo_root: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the roadmap index and print the summary
    Status {
        /// Explicit manifest path (default: resolver precedence chain)
        #[arg(long)]
        index: Option<PathBuf>,

        /// Emit the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load a KPI gate summary and print pass/fail cards
    Kpi {
        path: PathBuf,

        #[arg(long)]
        json: bool,
    },
    /// Load a canon provenance index and print source rows
    Canon {
        path: PathBuf,

        #[arg(long)]
        json: bool,
    },
    /// Sanitize a repository-relative path and resolve it to a file URL
    Resolve { path: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let override_root = cli
        .repo_root
        .clone()
        .or_else(|| env::var_os("VDM_REPO_ROOT").map(PathBuf::from));
    let resolver = Resolver::new(ResolverConfig {
        override_root,
        ..ResolverConfig::default()
    });
    log::debug!(
        "repository root override: {:?}",
        resolver.config().override_root
    );

    match cli.command {
        Commands::Status { index, json } => run_status(resolver, index.as_deref(), json),
        Commands::Kpi { path, json } => run_kpi(resolver, &path, json),
        Commands::Canon { path, json } => run_canon(resolver, &path, json),
        Commands::Resolve { path } => run_resolve(&resolver, &path),
    }
}

fn run_status(resolver: Resolver, index: Option<&Path>, json: bool) -> Result<()> {
    let mut store = DashboardStore::new(resolver);
    store
        .load_index(index)
        .context("failed to load roadmap index")?;
    let summary = store.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("repo head:         {}", or_dash(&summary.repo_head));
    println!("updated (UTC):     {}", or_dash(&summary.updated_utc));
    println!("proposals total:   {}", summary.total_proposals);
    println!("  with results:    {}", summary.results_total);
    println!("  missing results: {}", summary.proposals_missing_results);
    println!("orphan proposals:  {}", summary.orphan_proposals);
    println!("pending approvals: {}", summary.pending_approvals);
    println!("artifacts total:   {}", summary.artifacts_total);
    println!("code domains:      {}", summary.code_domains_tracked);
    println!("doc buckets:       {}", summary.documentation_buckets);

    if !summary.spotlight_cards.is_empty() {
        println!();
        println!("spotlight:");
        for card in &summary.spotlight_cards {
            let marker = if card.has_results { "x" } else { " " };
            println!("  [{marker}] {} ({})  {}", card.title, card.bucket, card.proposal_path);
        }
    }

    if !summary.reference_links.is_empty() {
        println!();
        println!("references:");
        for link in &summary.reference_links {
            println!("  {}  {}", link.label, link.path);
        }
    }

    Ok(())
}

fn run_kpi(resolver: Resolver, path: &Path, json: bool) -> Result<()> {
    let mut store = DashboardStore::new(resolver);
    store
        .load_kpi_summary(path)
        .context("failed to load KPI summary")?;

    if json {
        println!("{}", serde_json::to_string_pretty(store.kpi_cards())?);
        return Ok(());
    }

    for card in store.kpi_cards() {
        let verdict = if card.pass { "PASS" } else { "FAIL" };
        println!(
            "{verdict}  {}  {} {} {}",
            card.label, card.value, card.comparator, card.threshold
        );
    }
    Ok(())
}

fn run_canon(resolver: Resolver, path: &Path, json: bool) -> Result<()> {
    let mut store = DashboardStore::new(resolver);
    store
        .load_canon_index(path)
        .context("failed to load canon index")?;

    if json {
        println!("{}", serde_json::to_string_pretty(store.canon_sources())?);
        return Ok(());
    }

    for source in store.canon_sources() {
        println!(
            "{}  {}  {}  {}",
            source.label, source.last_commit, source.sha256, source.path
        );
    }
    Ok(())
}

fn run_resolve(resolver: &Resolver, raw: &str) -> Result<()> {
    let url = resolver
        .resolve_to_file_url(raw)
        .with_context(|| format!("cannot resolve {raw:?}"))?;
    println!("{url}");
    Ok(())
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}
