use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pims_clean::CleanConfig;
use pims_import::ImportConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pims")]
#[command(about = "Clean PIMS exports and import them into Postgres")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Normalize the raw export into the cleaned CSV.
    Clean {
        #[arg(long)]
        input: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Load the cleaned CSV into the database in one transaction.
    Import {
        #[arg(long)]
        input: Option<PathBuf>,
        /// Run every phase against an in-memory store instead of Postgres.
        #[arg(long)]
        dry_run: bool,
    },
    /// Apply the schema migrations.
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Clean {
        input: None,
        output: None,
    }) {
        Commands::Clean { input, output } => {
            let mut config = CleanConfig::from_env();
            if let Some(input) = input {
                config.input_path = input;
            }
            if let Some(output) = output {
                config.output_path = output;
            }
            let summary = pims_clean::run_clean(&config).await?;
            println!(
                "clean complete: run_id={} rows={} output={} report={}",
                summary.run_id,
                summary.rows,
                summary.output_path.display(),
                summary.report_path.display()
            );
        }
        Commands::Import { input, dry_run } => {
            let mut config = ImportConfig::from_env();
            if let Some(input) = input {
                config.input_path = input;
            }
            config.dry_run = dry_run;
            let summary = pims_import::run_import(&config).await?;
            println!(
                "import complete: run_id={} dry_run={} rows={} entries={} merged={} topic_links={}",
                summary.run_id,
                summary.dry_run,
                summary.counts.rows_read,
                summary.counts.entries_upserted,
                summary.counts.merged_duplicates,
                summary.counts.entry_topic_pairs
            );
        }
        Commands::Migrate => {
            let config = ImportConfig::from_env();
            pims_import::run_migrations(&config.database_url).await?;
            println!("migrations applied");
        }
    }

    Ok(())
}
