//! watchview CLI - expand captured debugger values the way a watch window does

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use watchview::cli;
use watchview::remote::{resolve_path, RowData};
use watchview::{
    Config, EvaluationFlags, InspectionContext, PointerWidth, ResultProvider, Snapshot,
};

#[derive(Parser)]
#[command(name = "watchview")]
#[command(about = "Expand debugger values into watch window rows", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a value from a snapshot file (.json, .yaml, .toml)
    Expand {
        /// Path to the snapshot
        snapshot: PathBuf,

        /// Child to descend into before expanding; repeat for deeper rows
        #[arg(short, long = "path")]
        path: Vec<String>,

        /// First row of the page
        #[arg(long, default_value_t = 0)]
        start: usize,

        /// Rows per page (defaults to the configured page size)
        #[arg(long)]
        count: Option<usize>,

        /// Show every row, ignoring --start and --count
        #[arg(long)]
        all: bool,

        /// Evaluate without side effects
        #[arg(long)]
        no_side_effects: bool,

        /// Leave out non-public members
        #[arg(long)]
        hide_non_public: bool,

        /// Treat the process as having native debugging disabled
        #[arg(long)]
        no_native: bool,

        /// Pointer width of the process in bits (32 or 64)
        #[arg(long)]
        pointer_width: Option<u32>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }

        Commands::Expand {
            snapshot,
            path,
            start,
            count,
            all,
            no_side_effects,
            hide_non_public,
            no_native,
            pointer_width,
            format,
        } => {
            let snapshot = Snapshot::from_file(&snapshot)?;

            let mut settings = snapshot.process.clone();
            if no_native {
                settings.native_debugging = false;
            }
            if let Some(bits) = pointer_width {
                PointerWidth::from_bits(bits)
                    .with_context(|| format!("--pointer-width must be 32 or 64, got {}", bits))?;
                settings.pointer_width = Some(bits);
            }

            let mut flags = EvaluationFlags::empty();
            flags.set(EvaluationFlags::NO_SIDE_EFFECTS, no_side_effects);
            flags.set(EvaluationFlags::HIDE_NON_PUBLIC, hide_non_public);

            let ctx = InspectionContext::new(Arc::new(settings.to_process()?)).with_flags(flags);
            let count = count.unwrap_or(config.page_size);
            let provider = ResultProvider::new(config);

            let root = provider.evaluate(
                snapshot.name.clone(),
                Some(snapshot.root_full_name()),
                snapshot.value,
            );

            let expanded = resolve_path(&provider, &ctx, root, &path).and_then(|row| {
                let children = if all {
                    provider.get_all_children(&ctx, &row)?
                } else {
                    provider.get_children(&ctx, &row, start, count)?
                };
                let total = provider.child_count(&ctx, &row)?;
                let rows = children
                    .iter()
                    .map(|child| RowData::from_row(&provider, &ctx, child))
                    .collect::<Result<Vec<_>>>()?;
                Ok((row, rows, total))
            });

            let (row, rows, total) = match expanded {
                Ok(expanded) => expanded,
                Err(e) => {
                    eprint!(
                        "{}",
                        watchview::error::format_evaluation_error(&snapshot.name, &e)
                    );
                    std::process::exit(1);
                }
            };

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                }
                OutputFormat::Yaml => {
                    print!("{}", serde_yaml::to_string(&rows)?);
                }
                OutputFormat::Text => {
                    let header = row.full_name().unwrap_or(row.name());
                    println!("{} {}", "Expanding".cyan().bold(), header);
                    if no_side_effects {
                        cli::warning("side effects disabled, native view rows are hidden");
                    }
                    if !row.has_children() {
                        cli::info("value has no children");
                    }
                    for data in &rows {
                        println!("{}", cli::format_row(data));
                    }
                    let first = if all { 0 } else { start };
                    println!();
                    println!("{}", cli::format_page_summary(first, rows.len(), total).dimmed());
                }
            }
        }
    }

    Ok(())
}
