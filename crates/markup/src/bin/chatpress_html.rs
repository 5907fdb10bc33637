// ABOUTME: CLI binary for publishing one exported transcript HTML page.
// ABOUTME: Mirrors the source-relative path under the output directory.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use chatpress_markup::{publish_file, PublishOptions};

#[derive(Parser, Debug)]
#[command(name = "chatpress-html")]
#[command(about = "Publish an exported chat-transcript HTML page")]
struct Args {
    /// Directory holding the exported pages
    #[arg(long = "source-dir")]
    source_dir: PathBuf,

    /// Directory receiving the published pages
    #[arg(long = "output-dir")]
    output_dir: PathBuf,

    /// Source-relative path of the page to publish
    #[arg(long = "file")]
    file: String,

    /// Banner fragment file; a relative name resolves inside the source dir
    #[arg(long, default_value = "banner.txt")]
    banner: PathBuf,

    /// Footer fragment file; a relative name resolves inside the source dir
    #[arg(long, default_value = "footer.txt")]
    footer: PathBuf,

    /// Published base URL; enables absolute asset links, OpenGraph metadata,
    /// and preview-image extraction
    #[arg(long = "base-url")]
    base_url: Option<String>,
}

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "publish failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let opts = PublishOptions {
        source_dir: args.source_dir,
        output_dir: args.output_dir,
        relative_path: args.file,
        banner: args.banner,
        footer: args.footer,
        base_url: args.base_url,
    };

    let report = publish_file(&opts)?;
    println!("{}", report.output_path.display());
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
