// ABOUTME: CLI binary that adds inferred heading bookmarks to PDF files in place.
// ABOUTME: Processes each input independently; one failing file does not stop the batch.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use chatpress_outline::{add_bookmarks, Thresholds};

#[derive(Parser, Debug)]
#[command(name = "chatpress-pdf")]
#[command(about = "Add heading bookmarks to exported transcript PDFs")]
struct Args {
    /// PDF files to rewrite in place
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Print the detected outline as JSON without modifying any file
    #[arg(long = "dry-run")]
    dry_run: bool,
}

fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();
    let thresholds = Thresholds::default();

    let mut had_error = false;
    for input in &args.inputs {
        match add_bookmarks(input, &thresholds, args.dry_run) {
            Ok(summary) => {
                if args.dry_run {
                    println!("{}", serde_json::to_string_pretty(&summary).unwrap());
                } else {
                    for entry in &summary.entries {
                        let indent = "  ".repeat(usize::from(entry.level) - 1);
                        println!("{indent}- {} (p{})", entry.title, entry.page);
                    }
                }
            }
            Err(err) => {
                error!(error = %err, "skipping file");
                had_error = true;
            }
        }
    }

    if had_error {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
