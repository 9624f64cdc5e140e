use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use skyacre_nn::{
    cv::CrossValidationHarness,
    data::{load_csv, synthetic_blobs, Dataset},
    diagnosis::diagnose_history,
    logging::{init_logging, LogConfig, LogLevel},
    pipeline::Pipeline,
    HarnessConfig, TrainingHistory,
};

#[derive(Parser, Debug)]
#[command(name = "skyacre-nn", version, about = "Cross-validated training of small dense classifiers")]
struct Cli {
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    log_level: LogLevel,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Runs stratified k-fold cross-validation and writes the report.
    Cv {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        overrides: ConfigArgs,
        #[arg(long, default_value = "cv_report.json")]
        out: PathBuf,
    },
    /// Trains a final model on a stratified split, diagnoses it and writes
    /// the report, model, scaler and history.
    Train {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        overrides: ConfigArgs,
        /// Run cross-validation first.
        #[arg(long)]
        cv: bool,
        #[arg(long, default_value = "runs/latest")]
        out_dir: PathBuf,
    },
    /// Diagnoses over/underfitting from a saved training history.
    Diagnose {
        history: PathBuf,
    },
    /// Writes the default configuration as JSON.
    InitConfig {
        #[arg(long, default_value = "config.json")]
        out: PathBuf,
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
struct DataArgs {
    /// CSV file; last column is the class index.
    #[arg(long, conflicts_with = "synthetic")]
    data: Option<PathBuf>,
    /// Number of classes; inferred from the labels when omitted.
    #[arg(long)]
    classes: Option<usize>,
    /// Use generated Gaussian blobs instead of a CSV file.
    #[arg(long)]
    synthetic: bool,
    #[arg(long, default_value_t = 100)]
    synthetic_per_class: usize,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    folds: Option<usize>,
    #[arg(long)]
    epochs: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    max_parameters: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_config = LogConfig { level: cli.log_level, ..LogConfig::default() };
    init_logging(&log_config).map_err(anyhow::Error::msg)?;

    match cli.command {
        Commands::Cv { data, overrides, out } => {
            let config = resolve_config(&overrides)?;
            let dataset = load_dataset(&data, &config)?;
            let report = CrossValidationHarness::new(config)?
                .run(&dataset)
                .context("cross-validation failed")?;
            write_json(&out, &report)?;
            println!(
                "{} folds: accuracy {:.4} ± {:.4}, weighted F1 {:.4} ± {:.4}",
                report.aggregate.n_folds,
                report.aggregate.val_accuracy.mean,
                report.aggregate.val_accuracy.std,
                report.aggregate.f1.mean,
                report.aggregate.f1.std,
            );
            println!("report written to {}", out.display());
        }
        Commands::Train { data, overrides, cv, out_dir } => {
            let config = resolve_config(&overrides)?;
            let dataset = load_dataset(&data, &config)?;
            let report = Pipeline::new(config.clone())?
                .run(&dataset, cv)
                .context("training pipeline failed")?;

            fs::create_dir_all(&out_dir)
                .with_context(|| format!("failed to create {}", out_dir.display()))?;
            write_json(&out_dir.join("report.json"), &report)?;
            write_json(&out_dir.join("history.json"), &report.history)?;
            write_json(&out_dir.join("config.json"), &config)?;
            if let Some(scaler) = &report.scaler {
                write_json(&out_dir.join("scaler.json"), scaler)?;
            }
            if let Some(network) = &report.network {
                write_json(&out_dir.join("model.json"), network)?;
            }

            println!("diagnosis: {} ({})", report.diagnosis.verdict, report.diagnosis.verdict.summary());
            for hint in report.diagnosis.verdict.suggestions() {
                println!("  - {}", hint);
            }
            println!(
                "holdout: accuracy {:.4}, weighted precision {:.4}, recall {:.4}, F1 {:.4}",
                report.holdout.accuracy,
                report.holdout.weighted.precision,
                report.holdout.weighted.recall,
                report.holdout.weighted.f1,
            );
            println!("artifacts written to {}", out_dir.display());
        }
        Commands::Diagnose { history } => {
            let path = history.to_string_lossy();
            let history = TrainingHistory::load_json(&path)
                .with_context(|| format!("failed to read history from {}", path))?;
            let diagnosis = diagnose_history(&history)?;
            println!("{}", serde_json::to_string_pretty(&diagnosis)?);
        }
        Commands::InitConfig { out, force } => {
            if out.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", out.display());
            }
            HarnessConfig::default().save_json(&out)?;
            println!("default configuration written to {}", out.display());
        }
    }

    Ok(())
}

fn resolve_config(args: &ConfigArgs) -> Result<HarnessConfig> {
    let mut config = match &args.config {
        Some(path) => HarnessConfig::load_json(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => HarnessConfig::default(),
    };
    if let Some(folds) = args.folds {
        config.n_splits = folds;
    }
    if let Some(epochs) = args.epochs {
        config.epochs = epochs;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if args.max_parameters.is_some() {
        config.max_parameters = args.max_parameters;
    }
    config.validate()?;
    Ok(config)
}

fn load_dataset(args: &DataArgs, config: &HarnessConfig) -> Result<Dataset> {
    let dataset = match (&args.data, args.synthetic) {
        (Some(path), _) => load_csv(path, args.classes)
            .with_context(|| format!("failed to load {}", path.display()))?,
        (None, true) => synthetic_blobs(args.synthetic_per_class, args.classes.unwrap_or(3), 4, 1.0, config.seed)?,
        (None, false) => bail!("either --data <csv> or --synthetic is required"),
    };
    tracing::info!(
        samples = dataset.len(),
        features = dataset.n_features(),
        classes = dataset.n_classes(),
        class_counts = ?dataset.class_counts(),
        "dataset loaded"
    );
    Ok(dataset)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    Ok(())
}
