//! distsync CLI - Mirror a local build directory into a Supabase Storage bucket.
//!
//! Usage:
//!   distsync sync --bucket <name> --root dist   - Upload every file under root
//!   distsync scan --root dist                   - List upload targets (dry run)
//!
//! Credentials come from flags or the SUPABASE_URL, SUPABASE_ACCESS_TOKEN
//! and SUPABASE_ANON_KEY environment variables. Exit code is 0 when every
//! file uploaded, non-zero otherwise.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use distsync::storage::BucketStatus;
use distsync::{RunSummary, SyncConfig, Synchronizer, UploadOutcome};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

/// distsync - Mirror a local build directory into a Supabase Storage bucket
#[derive(Parser)]
#[command(name = "distsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload every file under the root directory to the bucket
    Sync(SyncArgs),

    /// List upload targets without touching the network
    Scan {
        /// Local directory to scan
        #[arg(short, long, default_value = "dist")]
        root: PathBuf,
    },
}

#[derive(Args)]
struct SyncArgs {
    /// Local directory to mirror
    #[arg(short, long, default_value = "dist")]
    root: PathBuf,

    /// Target bucket name
    #[arg(short, long)]
    bucket: String,

    /// Supabase project URL (e.g., https://xyz.supabase.co)
    #[arg(long, env = "SUPABASE_URL")]
    base_url: String,

    /// Bearer access token for the Storage API
    #[arg(long, env = "SUPABASE_ACCESS_TOKEN", hide_env_values = true)]
    token: String,

    /// Project API key (sent as the apikey header)
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    api_key: String,

    /// Create the bucket as private instead of public
    #[arg(long)]
    private: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("distsync={}", log_level).parse().unwrap()),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Sync(args) => {
            let summary = cmd_sync(args)?;
            if !summary.is_clean() {
                std::process::exit(1);
            }
        }
        Commands::Scan { root } => cmd_scan(&root)?,
    }

    Ok(())
}

// ============ SYNC COMMAND ============

fn cmd_sync(args: SyncArgs) -> Result<RunSummary> {
    println!("{}", "distsync".bold().cyan());
    println!();

    let config = SyncConfig {
        base_url: args.base_url,
        bucket: args.bucket,
        access_token: args.token,
        api_key: args.api_key,
        public: !args.private,
        root: args.root,
    };
    config.validate()?;

    println!("Root:   {}", config.root.display().to_string().dimmed());
    println!("Bucket: {}", config.bucket.dimmed());
    println!();

    let sync = Synchronizer::new(config);

    // Step 1: Ensure bucket exists
    println!("{}", "Step 1/2: Checking bucket...".bold());
    match sync.ensure_bucket() {
        Some(BucketStatus::Created) => println!("  {} Bucket created", "✓".green()),
        Some(BucketStatus::AlreadyExists) => {
            println!("  {}", "Bucket already exists".dimmed())
        }
        None => println!(
            "  {} (continuing anyway)",
            "Warning: could not create bucket".yellow()
        ),
    }
    println!();

    // Step 2: Upload files
    println!("{}", "Step 2/2: Uploading files...".bold());
    let run = sync.run()?;

    if run.is_empty() {
        println!("  {}", "No files to upload".yellow());
        return Ok(RunSummary::default());
    }

    let progress = ProgressBar::new(run.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:30.cyan/blue} {pos}/{len}")
            .unwrap(),
    );

    let mut summary = RunSummary::default();
    for report in run {
        match &report.outcome {
            UploadOutcome::Succeeded => {
                progress.println(format!("  {} {}", "✓".green(), report.target.remote_key));
            }
            UploadOutcome::Failed(reason) => {
                progress.println(format!(
                    "  {} {} ({})",
                    "✗".red(),
                    report.target.remote_key,
                    reason.red()
                ));
            }
        }
        summary.record(&report.outcome);
        progress.inc(1);
    }
    progress.finish_and_clear();

    // Final tally
    println!();
    println!(
        "{} {} uploaded, {} failed",
        if summary.is_clean() {
            "✓".green()
        } else {
            "✗".red()
        },
        summary.succeeded.to_string().green(),
        summary.failed.to_string().red()
    );

    println!();
    println!("Frontend URL:");
    println!("  {}", sync.client().public_url("index.html").cyan());

    Ok(summary)
}

// ============ SCAN COMMAND ============

fn cmd_scan(root: &Path) -> Result<()> {
    println!("{}", "distsync scan".bold().cyan());
    println!();

    let targets = distsync::sync::collect_targets(root)?;

    if targets.is_empty() {
        println!("{}", "No files found.".yellow());
        return Ok(());
    }

    println!(
        "{} {} file(s) under {}:\n",
        "Found".green(),
        targets.len().to_string().green().bold(),
        root.display()
    );

    for target in &targets {
        println!(
            "  {} {}",
            target.remote_key.white().bold(),
            format!("({})", target.local_path.display()).dimmed()
        );
    }

    println!();
    Ok(())
}
