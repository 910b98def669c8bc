use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rust_wikistats::{ArticleFilter, FilterConfig};

/// Keep page-view records for one project and a fixed list of articles.
///
/// Reads `<id> <project> <article> ...` lines from stdin and writes the
/// matching ones to stdout. The project comes from `WIKI_PROJ`.
#[derive(Debug, Parser)]
#[command(name = "article-filter", version)]
struct Cli {
    /// Article list, one title per line [default: tst.txt]
    #[arg(long, value_name = "PATH")]
    articles: Option<PathBuf>,

    /// Log debug details to stderr
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    if let Err(error) = run() {
        eprintln!("article-filter error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let mut config = FilterConfig::load().context("failed to load filter configuration")?;
    if let Some(path) = cli.articles {
        config = config.with_articles_path(path);
    }

    let filter = ArticleFilter::from_config(&config)?;

    let stdin = io::stdin().lock();
    let stdout = BufWriter::new(io::stdout().lock());
    filter
        .run(stdin, stdout)
        .context("failed while filtering standard input")?;
    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("ARTICLE_FILTER_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
