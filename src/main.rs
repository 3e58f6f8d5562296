// ========================================================================================
//
//                              The laude command-line front end
//
// ========================================================================================
//
// Thin plumbing around the inference library: load the artifact bundle,
// run records through the pipeline, and report results on stdout. The
// bundle is loaded exactly once per invocation; any artifact problem is
// fatal before the first record is scored.

#![deny(dead_code)]
#![deny(unused_imports)]

use clap::{Args, Parser, Subcommand};
use laude::artifacts::{ArtifactStatus, ModelArtifacts};
use laude::batch;
use laude::pipeline;
use laude::validate::RawStudentRecord;
use std::error::Error;
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[clap(
    name = "laude",
    version,
    about = "An inference engine for student academic-performance prediction."
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score one student record (JSON) and print the prediction as JSON.
    Predict(PredictArgs),
    /// Score a CSV of student records across all cores.
    Batch(BatchArgs),
    /// Report artifact availability for the serving layer.
    Health(HealthArgs),
}

#[derive(Args)]
struct PredictArgs {
    /// Directory containing encoders.toml, scaler.toml and model.toml.
    #[clap(long, value_name = "DIR")]
    artifacts: PathBuf,

    /// Path to a JSON student record. Reads stdin when omitted.
    #[clap(long, value_name = "FILE")]
    input: Option<PathBuf>,
}

#[derive(Args)]
struct BatchArgs {
    /// Directory containing encoders.toml, scaler.toml and model.toml.
    #[clap(long, value_name = "DIR")]
    artifacts: PathBuf,

    /// CSV of student records, one per row, with a header.
    #[clap(long, value_name = "FILE")]
    input: PathBuf,

    /// Destination CSV of predictions, one row per input row.
    #[clap(long, value_name = "FILE")]
    output: PathBuf,
}

#[derive(Args)]
struct HealthArgs {
    /// Directory containing encoders.toml, scaler.toml and model.toml.
    #[clap(long, value_name = "DIR")]
    artifacts: PathBuf,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::Predict(args) => {
            let artifacts = ModelArtifacts::load(&args.artifacts)?;
            let raw: RawStudentRecord = match &args.input {
                Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
                None => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    serde_json::from_str(&buffer)?
                }
            };
            let prediction = pipeline::predict_record(&raw, &artifacts)?;
            println!("{}", serde_json::to_string_pretty(&prediction)?);
        }
        Command::Batch(args) => {
            let artifacts = ModelArtifacts::load(&args.artifacts)?;
            eprintln!("> Scoring records from '{}'.", args.input.display());
            let scored = batch::score_csv(&args.input, &args.output, &artifacts)?;
            eprintln!(
                "> Scored {scored} records; predictions written to '{}'.",
                args.output.display()
            );
        }
        Command::Health(args) => {
            let status = ArtifactStatus::probe(&args.artifacts);
            println!("{}", serde_json::to_string_pretty(&status)?);
            if !status.all_loaded() {
                process::exit(1);
            }
        }
    }
    Ok(())
}
