use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use staka_cli::env_cleanup::{clean_env_file, FileCleanup, ENV_FILE_CANDIDATES};
use staka_cli::init_tracing;
use std::path::Path;

#[derive(Parser, Debug)]
#[command(name = "clean_env", version)]
#[command(about = "Comment out the S3 storage variables left in the .env files of the working directory")]
struct Args {}

fn main() -> Result<()> {
    init_tracing();
    let _args = Args::parse();
    let now = Utc::now();

    let mut annotated_total = 0;
    let mut files_cleaned = 0;
    for candidate in ENV_FILE_CANDIDATES {
        let path = Path::new(candidate);
        match clean_env_file(path, now).with_context(|| format!("Failed to clean {}", candidate))? {
            FileCleanup::Missing => println!("{}: not found, skipped", candidate),
            FileCleanup::Unchanged => println!("{}: nothing to clean", candidate),
            FileCleanup::Cleaned { annotated, removed } => {
                println!(
                    "{}: {} variable(s) deprecated, {} stale line(s) removed",
                    candidate, annotated, removed
                );
                annotated_total += annotated;
                files_cleaned += 1;
            }
        }
    }

    println!(
        "Done: {} variable(s) deprecated across {} file(s).",
        annotated_total, files_cleaned
    );
    Ok(())
}
