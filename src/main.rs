//! novel-binder - bind scraped chapters into EPUB volumes

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use novel_binder::manifest::Manifest;
use novel_binder::{BookAssembler, Result};

#[derive(Parser)]
#[command(name = "novel-binder")]
#[command(version, about = "Bind scraped novel chapters into EPUB files", long_about = None)]
#[command(after_help = "EXAMPLES:
    novel-binder novel.json                  Write EPUBs next to the manifest
    novel-binder novel.json -o out           Write EPUBs into out/epub/
    novel-binder novel.json --no-volume-suffix")]
struct Cli {
    /// JSON manifest with metadata and chapters
    #[arg(value_name = "MANIFEST")]
    manifest: PathBuf,

    /// Output root (artifacts go to <OUTPUT>/epub/)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Base file name of the artifacts
    #[arg(short, long)]
    name: Option<String>,

    /// Cover image path
    #[arg(short, long)]
    cover: Option<PathBuf>,

    /// Language tag
    #[arg(short, long)]
    language: Option<String>,

    /// Do not append the volume label to file names
    #[arg(long)]
    no_volume_suffix: bool,

    /// Log debug output
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(cli) {
        Ok(paths) => {
            for path in paths {
                println!("{}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<Vec<PathBuf>> {
    let mut manifest = Manifest::load(&cli.manifest)?;
    debug!(path = %cli.manifest.display(), volumes = manifest.volumes.len(), "Loaded manifest");

    // Paths given on the command line are relative to the working directory,
    // not to the manifest.
    if let Some(output) = cli.output {
        manifest.output = Some(std::path::absolute(output)?);
    }
    if let Some(name) = cli.name {
        manifest.file_name = Some(name);
    }
    if let Some(cover) = cli.cover {
        manifest.cover = Some(std::path::absolute(cover)?);
    }
    if let Some(language) = cli.language {
        manifest.language = Some(language);
    }
    manifest.no_volume_suffix |= cli.no_volume_suffix;

    let base_dir = cli
        .manifest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let (options, volumes) = manifest.into_options(base_dir);
    BookAssembler::new(options).bind_volumes(&volumes)
}
