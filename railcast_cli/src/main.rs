use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use railcast_features::{parse_date, DateFormat, FeatureVector, Observation};
use railcast_modeling::{
    train, SelectedModel, TrainingFrame, TrainingOptions, DEFAULT_HOLDOUT_FRACTION, DEFAULT_SEED,
};
use shared_logging::EventLog;

#[derive(Parser, Debug)]
#[command(name = "railcast", version, about = "Train-delay model training and inspection")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Trains the candidate roster and persists the best model.
    Train(TrainArgs),
    /// Prints metadata of a persisted model artifact.
    Inspect {
        /// Artifact to inspect.
        #[arg(long)]
        artifact: PathBuf,
    },
    /// Runs one local prediction against a persisted artifact.
    Predict(PredictArgs),
}

#[derive(Parser, Debug)]
struct TrainArgs {
    /// Historical dataset CSV (dates as DD-MM-YYYY).
    #[arg(long)]
    data: PathBuf,
    /// Where to write the model artifact.
    #[arg(long)]
    out: PathBuf,
    /// Seed for the split and model randomness.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Fraction of rows held out for evaluation.
    #[arg(long, default_value_t = DEFAULT_HOLDOUT_FRACTION)]
    holdout: f64,
    /// Structured event log to append run events to.
    #[arg(long)]
    log: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PredictArgs {
    /// Artifact to predict with.
    #[arg(long)]
    artifact: PathBuf,
    /// Journey date as YYYY-MM-DD.
    #[arg(long)]
    date: String,
    /// Temperature reading.
    #[arg(long)]
    temperature: f64,
    /// Rain indicator (0/1).
    #[arg(long, default_value_t = 0)]
    rain: u8,
    /// Fog indicator (0/1).
    #[arg(long, default_value_t = 0)]
    fog: u8,
    /// Visibility reading.
    #[arg(long)]
    visibility: f64,
    /// Wind speed reading.
    #[arg(long)]
    windspeed: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Train(args) => handle_train(&args),
        Commands::Inspect { artifact } => handle_inspect(&artifact),
        Commands::Predict(args) => handle_predict(&args),
    }
}

fn handle_train(args: &TrainArgs) -> Result<()> {
    let events = args.log.as_ref().map(EventLog::open).transpose()?;

    let frame = TrainingFrame::from_csv_path(&args.data)
        .with_context(|| format!("loading dataset {}", args.data.display()))?;
    println!(
        "loaded {} rows ({} dropped for unparseable dates)",
        frame.len(),
        frame.dropped_rows
    );
    if let Some(log) = &events {
        log.info(
            "trainer",
            "dataset_loaded",
            json!({ "rows": frame.len(), "dropped": frame.dropped_rows }),
        )?;
    }

    let options = TrainingOptions {
        seed: args.seed,
        holdout_fraction: args.holdout,
    };
    let outcome = train(&frame, options).context("training failed")?;

    println!();
    println!("{:<20} {:>12} {:>10}", "Model", "MSE", "R2");
    println!("{}", "-".repeat(44));
    for evaluation in &outcome.evaluations {
        println!(
            "{:<20} {:>12.4} {:>10.4}",
            evaluation.model.label(),
            evaluation.mse,
            evaluation.r2
        );
    }
    println!();
    println!(
        "selected: {} (trained on {} rows, evaluated on {})",
        outcome.artifact.kind, outcome.artifact.training_rows, outcome.artifact.holdout_rows
    );

    outcome
        .artifact
        .save(&args.out)
        .with_context(|| format!("writing artifact {}", args.out.display()))?;
    println!("artifact written to {}", args.out.display());

    if let Some(log) = &events {
        for evaluation in &outcome.evaluations {
            log.info(
                "trainer",
                "candidate_scored",
                json!({
                    "model": evaluation.model.label(),
                    "mse": evaluation.mse,
                    "r2": evaluation.r2,
                }),
            )?;
        }
        log.info(
            "trainer",
            "training_complete",
            json!({
                "selected": outcome.artifact.kind.label(),
                "artifact": args.out.display().to_string(),
            }),
        )?;
    }
    Ok(())
}

fn handle_inspect(artifact: &Path) -> Result<()> {
    let model = SelectedModel::load(artifact)
        .with_context(|| format!("loading artifact {}", artifact.display()))?;
    let summary = json!({
        "kind": model.kind.label(),
        "trained_at": model.trained_at,
        "seed": model.seed,
        "holdout_fraction": model.holdout_fraction,
        "training_rows": model.training_rows,
        "holdout_rows": model.holdout_rows,
        "dropped_rows": model.dropped_rows,
        "feature_names": model.feature_names,
        "evaluations": model.evaluations,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn handle_predict(args: &PredictArgs) -> Result<()> {
    let model = SelectedModel::load(&args.artifact)
        .with_context(|| format!("loading artifact {}", args.artifact.display()))?;
    let date = parse_date(&args.date, DateFormat::Live)?;
    let observation = Observation::new(
        date,
        args.temperature,
        args.rain != 0,
        args.fog != 0,
        args.visibility,
        args.windspeed,
    );
    let features = FeatureVector::from_observation(&observation);
    let predicted = model.predict_rounded(&features)?;
    println!("predicted delay: {predicted:.2} minutes");
    Ok(())
}
