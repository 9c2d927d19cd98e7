use anyhow::Context;
use clap::{Parser, Subcommand};
use rankprep::{
    get_pointwise_metrics, get_ranking_metrics, ArtifactStore, Dataset, MetricRegistry,
    Preprocessor, PreprocessorOptions, Schema, SchemaConfig,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Schema-driven preprocessing and evaluation for search-ranking data
#[derive(Parser, Debug)]
#[command(name = "rankprep")]
#[command(about = "Preprocess and evaluate search-ranking data", long_about = None)]
struct Args {
    /// Log level, overridden by RUST_LOG when set
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Learn statistics from a reference dataset and store them
    Fit {
        /// Schema configuration (JSON)
        #[arg(long)]
        schema: PathBuf,

        /// Reference dataset (JSON array of rows)
        #[arg(long)]
        data: PathBuf,

        /// Artifact directory
        #[arg(long, default_value = "./artifacts")]
        store: PathBuf,

        /// Model version name
        #[arg(long)]
        name: String,
    },

    /// Preprocess a dataset with stored statistics
    Transform {
        #[arg(long, default_value = "./artifacts")]
        store: PathBuf,

        #[arg(long)]
        name: String,

        #[arg(long)]
        data: PathBuf,

        /// Output file, stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,

        /// Keep columns the schema does not model
        #[arg(long)]
        keep_unmodeled: bool,

        /// Replacement for a zero standard deviation
        #[arg(long, default_value_t = rankprep::DEFAULT_EPSILON)]
        epsilon: f64,
    },

    /// Compute metrics of a scored dataset
    Evaluate {
        #[arg(long, default_value = "./artifacts")]
        store: PathBuf,

        #[arg(long)]
        name: String,

        #[arg(long)]
        data: PathBuf,

        /// Column holding the predicted scores
        #[arg(long, default_value = "prediction")]
        prediction_col: String,

        /// Pointwise metrics, comma separated
        #[arg(long, value_delimiter = ',')]
        pointwise: Vec<String>,

        /// Per-query ranking metrics, comma separated
        #[arg(long, value_delimiter = ',', default_value = "ndcg_score")]
        ranking: Vec<String>,
    },

    /// List stored artifacts
    List {
        #[arg(long, default_value = "./artifacts")]
        store: PathBuf,
    },
}

#[derive(Serialize)]
struct EvaluationReport {
    pointwise: BTreeMap<String, f64>,
    ranking: BTreeMap<String, f64>,
}

fn read_dataset(path: &Path) -> anyhow::Result<Dataset> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read dataset {}", path.display()))?;
    Dataset::from_json_str(&json).with_context(|| format!("Invalid dataset {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.as_str()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("rankprep v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Fit {
            schema,
            data,
            store,
            name,
        } => {
            let config = SchemaConfig::from_path(&schema)
                .with_context(|| format!("Failed to load schema {}", schema.display()))?;
            let schema = Schema::build(&config)?;
            let reference = read_dataset(&data)?;
            let fitted = schema.fit(&reference)?;

            let store = ArtifactStore::new(&store)?;
            let description = store.save(&name, &fitted)?;
            info!("Stored '{}' in {}", name, store.dir().display());
            print_json(&description)?;
        }
        Command::Transform {
            store,
            name,
            data,
            out,
            keep_unmodeled,
            epsilon,
        } => {
            let fitted = ArtifactStore::new(&store)?.load(&name)?;
            let options = PreprocessorOptions::default()
                .epsilon(epsilon)
                .drop_unmodeled_columns(!keep_unmodeled);
            let preprocessor = Preprocessor::with_options(Arc::new(fitted), options)?;

            let processed = preprocessor.apply(&read_dataset(&data)?)?;
            let json = serde_json::to_string_pretty(&processed.to_records())?;
            match out {
                Some(path) => {
                    fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Wrote {} rows to {}", processed.num_rows(), path.display());
                }
                None => println!("{}", json),
            }
        }
        Command::Evaluate {
            store,
            name,
            data,
            prediction_col,
            pointwise,
            ranking,
        } => {
            let fitted = ArtifactStore::new(&store)?.load(&name)?;
            let scored = read_dataset(&data)?;
            let registry = MetricRegistry::default();

            let report = EvaluationReport {
                pointwise: get_pointwise_metrics(
                    &registry,
                    &scored,
                    fitted.schema(),
                    &prediction_col,
                    pointwise.as_slice(),
                )?,
                ranking: get_ranking_metrics(
                    &registry,
                    &scored,
                    fitted.schema(),
                    &prediction_col,
                    ranking.as_slice(),
                )?,
            };
            print_json(&report)?;
        }
        Command::List { store } => {
            print_json(&ArtifactStore::new(&store)?.list()?)?;
        }
    }

    Ok(())
}
