//! deb-scanpackages CLI
//!
//! Command-line interface for generating a Packages index from a directory
//! of Debian binary packages.

use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use deb_meta::{MetadataBuilder, SumSet};
use deb_scanpackages::{Error, PackagesIndex, Result};

#[derive(Parser)]
#[command(name = "deb-scanpackages")]
#[command(about = "Generate an APT Packages index from a directory of .deb files", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Directory to scan for .deb files
    dir: PathBuf,

    /// Path prefix for Filename fields
    #[arg(short, long, env = "DEB_SCAN_PREFIX", default_value = "")]
    prefix: String,

    /// Checksums to include (comma separated: md5, sha1, sha256, all, none)
    #[arg(short, long, env = "DEB_SCAN_SUMS", default_value = "all")]
    sums: SumSet,

    /// Output file (stdout if not given)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write a gzip-compressed copy next to the output file
    #[arg(long, requires = "output")]
    gzip: bool,

    /// Number of parallel workers
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Fail on the first unreadable package instead of skipping it
    #[arg(long)]
    strict: bool,
}

fn setup_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "error" => Level::ERROR,
        "warn" => Level::WARN,
        "info" => Level::INFO,
        "debug" => Level::DEBUG,
        "trace" => Level::TRACE,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    if let Some(jobs) = cli.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .map_err(|e| Error::Other(e.to_string()))?;
    }

    let builder = MetadataBuilder::new(cli.sums).with_prefix(cli.prefix);
    let index = PackagesIndex::scan(&cli.dir, &builder, cli.strict)?;

    match &cli.output {
        Some(output) => {
            index.write_to(BufWriter::new(File::create(output)?))?;
            info!("Wrote {} packages -> {:?}", index.len(), output);

            if cli.gzip {
                let mut gz_path = output.clone().into_os_string();
                gz_path.push(".gz");
                let gz_path = PathBuf::from(gz_path);

                index.write_gzip(BufWriter::new(File::create(&gz_path)?))?;
                info!("Wrote compressed index -> {:?}", gz_path);
            }
        }
        None => index.write_to(io::stdout().lock())?,
    }

    Ok(())
}
