use subsplit::chunker::{self, SplitOptions};
use subsplit::parser::{Parser, Strictness};
use subsplit::serialiser::{self, OutputFormat};

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser as ClapParser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn main() {
    match run() {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
        }
    }
}

#[derive(ClapParser)]
#[command(
    name = "subsplit",
    version,
    about = "Split an SRT subtitle file into overlapping time chunks"
)]
struct Cli {
    /// The SRT file to split.
    input: PathBuf,

    /// Duration of each chunk, in minutes.
    #[arg(short, long, default_value_t = 30)]
    duration: u64,

    /// Overlap between consecutive chunks, in minutes.
    #[arg(short, long, default_value_t = 2)]
    overlap: u64,

    /// Output format: srt, txt or both.
    #[arg(short, long, default_value = "both")]
    format: String,

    /// Directory to write chunks to. Defaults to '<input stem>_chunks'.
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Fail on defective blocks instead of skipping them.
    #[arg(long)]
    strict: bool,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let format: OutputFormat = cli
        .format
        .parse()
        .map_err(|reason: String| anyhow!(reason))?;
    let opts = SplitOptions::from_minutes(cli.duration, cli.overlap)?;
    let strictness = if cli.strict {
        Strictness::Strict
    } else {
        Strictness::Lenient
    };

    let data = std::fs::read_to_string(&cli.input)
        .context(format!("Failed to open input file: '{}'", cli.input.display()))?;

    let subs = Parser::new(strictness)
        .parse(&data)
        .context(format!("Failed to parse SRT file: '{}'", cli.input.display()))?;
    if subs.is_empty() {
        return Err(anyhow!(
            "No subtitle entries found in '{}'.",
            cli.input.display()
        ));
    }

    let total_duration = subs.iter().map(|s| s.end).max().unwrap_or_default();
    info!("Loaded {} subtitle entries", subs.len());
    info!(
        "Total duration: {:.1} minutes",
        total_duration.as_secs_f64() / 60.0
    );

    let chunks = chunker::split_by_time(&subs, &opts);
    info!(
        "Created {} chunks of {} minutes with {} minutes overlap",
        chunks.len(),
        cli.duration,
        cli.overlap
    );

    let output_dir = cli
        .output_dir
        .unwrap_or_else(|| default_output_dir(&cli.input));
    serialiser::serialise_chunks(&chunks, &output_dir, format)?;

    info!("All chunks saved to '{}'", output_dir.display());

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();
}

/// Default output directory: the input's file stem with a `_chunks`
/// suffix, relative to the working directory.
fn default_output_dir(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    PathBuf::from(format!("{}_chunks", stem.to_string_lossy()))
}
