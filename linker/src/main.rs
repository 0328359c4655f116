use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use linker::{build_snapshot, link, score_snapshot, PairFilter};
use linkage_core::{Normalization, PipelineConfig, Tokenizer, TracingSink, DEFAULT_ADHOC_NGRAM};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "linker")]
#[command(about = "Block and score candidate matches between two bibliographic datasets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read two datasets, block on author n-grams and write scored pairs
    Link {
        /// First dataset (.csv, .json or .jsonl)
        #[arg(long)]
        left: PathBuf,
        /// Second dataset
        #[arg(long)]
        right: PathBuf,
        /// Output file (.csv or .jsonl)
        #[arg(long)]
        output: PathBuf,
        #[command(flatten)]
        config: ConfigArgs,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Build and save the corpus and blocking index
    Build {
        #[arg(long)]
        left: PathBuf,
        #[arg(long)]
        right: PathBuf,
        /// Output snapshot directory
        #[arg(long)]
        output: PathBuf,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Score a snapshot written by `build`
    Score {
        /// Snapshot directory
        #[arg(long, default_value = "./index")]
        index: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Worker threads (defaults to all cores)
        #[arg(long)]
        threads: Option<usize>,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Print the n-gram tokens of a piece of text
    Tokenize {
        #[arg(long)]
        text: String,
        #[arg(long, default_value_t = DEFAULT_ADHOC_NGRAM)]
        n: usize,
        #[arg(long, default_value_t = Normalization::Strip)]
        normalization: Normalization,
    },
}

#[derive(Args)]
struct ConfigArgs {
    /// JSON pipeline config; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    ngram_size: Option<usize>,
    #[arg(long)]
    normalization: Option<Normalization>,
    #[arg(long)]
    threads: Option<usize>,
}

impl ConfigArgs {
    fn resolve(self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_json_file(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(n) = self.ngram_size { config.ngram_size = n; }
        if let Some(norm) = self.normalization { config.normalization = norm; }
        if self.threads.is_some() { config.threads = self.threads; }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Args)]
struct FilterArgs {
    /// Drop pairs scoring below this value
    #[arg(long)]
    min_score: Option<f64>,
    /// One row per record pair instead of one per shared token
    #[arg(long, default_value_t = false)]
    dedup: bool,
    /// Only keep pairs spanning both datasets
    #[arg(long, default_value_t = false)]
    cross_only: bool,
}

impl From<FilterArgs> for PairFilter {
    fn from(a: FilterArgs) -> Self {
        PairFilter { min_score: a.min_score, dedup: a.dedup, cross_only: a.cross_only }
    }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let sink = TracingSink;

    match cli.command {
        Commands::Link { left, right, output, config, filter } => {
            link(&left, &right, &output, config.resolve()?, &filter.into(), &sink)?;
        }
        Commands::Build { left, right, output, config } => {
            build_snapshot(&left, &right, &output, config.resolve()?, &sink)?;
        }
        Commands::Score { index, output, threads, filter } => {
            score_snapshot(&index, &output, threads, &filter.into(), &sink)?;
        }
        Commands::Tokenize { text, n, normalization } => {
            let tokenizer = Tokenizer::new(n, normalization)?;
            for token in tokenizer.tokenize(Some(text.as_str())) {
                println!("{token}");
            }
        }
    }
    Ok(())
}
