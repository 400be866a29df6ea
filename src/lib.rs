//! yolocls: mirror YOLO label trees and annotate detection labels as
//! one-hot classification vectors.
//!
//! # Modules
//!
//! - [`mirror`]: overwrite same-named `.txt` files from a source tree into a target tree
//! - [`label`]: label line grammar (one-hot, horizontal box, oriented box) and file rewrite
//! - [`session`]: dataset discovery and the image-by-image annotation session
//! - [`wizard`]: the linear page flow leading into a session
//! - [`convert`]: batch conversion of box labels into one-hot lines
//! - [`error`]: Error types for yolocls operations

pub mod config;
pub mod console;
pub mod convert;
pub mod error;
pub mod label;
pub mod logging;
pub mod mirror;
pub mod session;
pub mod wizard;

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use error::YoloclsError;

/// The yolocls CLI application.
#[derive(Parser)]
#[command(name = "yolocls")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    log: config::LogSettings,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Overwrite same-named .txt files in TARGET with the ones from SOURCE.
    Overwrite(OverwriteArgs),
    /// Annotate a dataset interactively, one class per image.
    Annotate(AnnotateArgs),
    /// Print the label state of one image without changing anything.
    Show(ShowArgs),
    /// Append one-hot lines to label files that still end in a box line.
    Convert(ConvertArgs),
}

/// Arguments for the overwrite subcommand.
#[derive(clap::Args)]
struct OverwriteArgs {
    /// Directory holding the new label files.
    source: PathBuf,

    /// Directory whose label files are overwritten in place.
    target: PathBuf,

    /// Number of copy worker threads (default: one per CPU).
    #[arg(long, env = "YOLOCLS_WORKERS")]
    workers: Option<usize>,

    /// Report what would be copied without copying.
    #[arg(long)]
    dry_run: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Dataset selection shared by the annotation subcommands.
#[derive(clap::Args)]
struct DatasetArgs {
    /// Dataset root containing images/ and labels/ (or labelTxt/).
    dataset: PathBuf,

    /// Class name, in option order. Repeat for each class. Defaults to
    /// data.yaml or classes.txt in the dataset root.
    #[arg(long = "class", short = 'c')]
    classes: Vec<String>,
}

/// Arguments for the annotate subcommand.
#[derive(clap::Args)]
struct AnnotateArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    /// Do not write an all-zero line for images left without a selection.
    #[arg(long)]
    skip_unselected: bool,
}

/// Arguments for the show subcommand.
#[derive(clap::Args)]
struct ShowArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    /// Image index in sorted file name order, starting at 0.
    #[arg(long, default_value_t = 0)]
    index: usize,

    /// Output format ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    #[command(flatten)]
    dataset: DatasetArgs,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Run the yolocls CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), YoloclsError> {
    let cli = Cli::parse();
    let _guard = logging::init_logging(&cli.log)?;

    match cli.command {
        Some(Commands::Overwrite(args)) => run_overwrite(args),
        Some(Commands::Annotate(args)) => run_annotate(args),
        Some(Commands::Show(args)) => run_show(args),
        Some(Commands::Convert(args)) => run_convert(args),
        None => {
            println!("yolocls {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Mirror YOLO label trees and annotate detection labels as one-hot vectors.");
            println!();
            println!("Run 'yolocls --help' for usage information.");
            Ok(())
        }
    }
}

fn run_overwrite(args: OverwriteArgs) -> Result<(), YoloclsError> {
    let options = mirror::OverwriteOptions {
        workers: args.workers,
        dry_run: args.dry_run,
    };
    let report = mirror::overwrite(&args.source, &args.target, &options)?;

    match args.output.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print!("{}", report),
    }
    Ok(())
}

fn run_annotate(args: AnnotateArgs) -> Result<(), YoloclsError> {
    let options = session::SessionOptions {
        skip_unselected: args.skip_unselected,
    };
    let stdin = io::stdin();
    let stdout = io::stdout();
    console::run_annotate(
        &args.dataset.dataset,
        args.dataset.classes,
        options,
        &mut stdin.lock(),
        &mut stdout.lock(),
    )
}

fn run_show(args: ShowArgs) -> Result<(), YoloclsError> {
    let mut session = session::load(
        &args.dataset.dataset,
        args.dataset.classes,
        session::SessionOptions::default(),
    )?;
    let view = session.display(args.index)?;

    match args.output.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(view)?),
        _ => print!("{}", view),
    }
    Ok(())
}

fn run_convert(args: ConvertArgs) -> Result<(), YoloclsError> {
    let dataset = session::Dataset::load(&args.dataset.dataset, args.dataset.classes)?;
    let report = convert::convert_legacy_labels(&dataset)?;

    match args.output.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print!("{}", report),
    }
    Ok(())
}
