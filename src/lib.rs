//! Stalgebra: a spatiotemporal interval algebra.
//!
//! Stalgebra answers compositional queries over labeled boxes in time and
//! space ("a person overlapping a car within half a second") without
//! hand-written nested loops. Detections are grouped per source into an
//! [`IntervalSetMapping`], and queries compose filters, maps, set operations
//! and windowed joins over it.
//!
//! # Modules
//!
//! - [`model`]: bounds, intervals, the detection payload and file loaders
//! - [`predicate`]: composable relations over bounds
//! - [`set`]: the sorted interval set and its operations, including joins
//! - [`mapping`]: per-key lifting of every set operation
//! - [`merge`]: ready-made merge functions
//! - [`runtime`]: parallel execution on a rayon pool
//! - [`validation`] and [`inspect`]: reports over loaded detections
//! - [`error`]: the crate error type
//!
//! # Example
//!
//! ```
//! use stalgebra::model::{Axis, Bounds, Interval};
//! use stalgebra::set::IntervalSet;
//!
//! let people = IntervalSet::new(vec![Interval::new(Bounds::temporal(0.0, 1.0), "person")]);
//! let cars = IntervalSet::new(vec![Interval::new(Bounds::temporal(1.2, 2.0), "car")]);
//!
//! let before = Axis::T.before(Some(0.5));
//! let near = people.join_on(&cars, &before, stalgebra::merge::span_pair);
//! assert_eq!(near.len(), 1);
//! assert_eq!(near.intervals()[0].bounds.t.as_tuple(), (0.0, 2.0));
//! ```

pub mod error;
pub mod inspect;
pub mod mapping;
pub mod merge;
pub mod model;
pub mod predicate;
pub mod runtime;
pub mod set;
pub mod validation;

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;

pub use error::StalgebraError;
pub use mapping::IntervalSetMapping;
pub use model::{Bounds, Detection, DetectionMapping, Interval};
pub use set::IntervalSet;

use model::Axis;
use predicate::BoundsPredicate;
use runtime::{Runtime, RuntimeConfig};

/// The stalgebra CLI application.
#[derive(Parser)]
#[command(name = "stalgebra")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Validate a detection file for errors and warnings.
    Validate(ValidateArgs),
    /// Summarize a detection file.
    Inspect(InspectArgs),
    /// Filter, coalesce and join detections, writing the result as JSON.
    Query(QueryArgs),
}

#[derive(clap::Args)]
struct ValidateArgs {
    /// Input file to validate.
    input: PathBuf,

    /// Input format ('json' or 'csv').
    #[arg(long, default_value = "json")]
    format: String,

    /// Treat warnings as errors (exit non-zero if any warnings).
    #[arg(long)]
    strict: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

#[derive(clap::Args)]
struct InspectArgs {
    /// Input file to inspect.
    input: PathBuf,

    /// Input format ('json' or 'csv').
    #[arg(long, default_value = "json")]
    format: String,

    /// Number of labels shown in the histogram.
    #[arg(long, default_value_t = 10)]
    top_labels: usize,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

#[derive(clap::Args)]
struct QueryArgs {
    /// Input detection file.
    input: PathBuf,

    /// Input format ('json' or 'csv').
    #[arg(long, default_value = "json")]
    format: String,

    /// Keep only detections with this label.
    #[arg(long)]
    label: Option<String>,

    /// Keep only detections scoring at least this much (unscored ones are dropped).
    #[arg(long)]
    min_score: Option<f64>,

    /// Keep only detections lasting at least this long.
    #[arg(long)]
    min_length: Option<f64>,

    /// Merge same-label detections separated by at most this gap.
    #[arg(long)]
    coalesce_gap: Option<f64>,

    /// Pair each detection with detections of this label under the same key.
    #[arg(long, requires = "window")]
    with_label: Option<String>,

    /// How far apart in time paired detections may be.
    #[arg(long, requires = "with_label")]
    window: Option<f64>,

    /// Only pair detections whose boxes overlap in space.
    #[arg(long, requires = "with_label")]
    spatial_overlap: bool,

    /// Worker threads (0 = one per core).
    #[arg(long, env = "STALGEBRA_THREADS", default_value_t = 0)]
    threads: usize,

    /// Write the result here instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

/// Run the stalgebra CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), StalgebraError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Validate(args)) => run_validate(args),
        Some(Commands::Inspect(args)) => run_inspect(args),
        Some(Commands::Query(args)) => run_query(args),
        None => {
            println!("stalgebra {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("A spatiotemporal interval algebra for labeled detections.");
            println!();
            println!("Run 'stalgebra --help' for usage information.");
            Ok(())
        }
    }
}

/// Loads detections in the named format.
fn read_detections(path: &Path, format: &str) -> Result<DetectionMapping, StalgebraError> {
    match format {
        "json" => model::io_json::read_detections_json(path),
        "csv" => model::io_csv::read_detections_csv(path),
        other => Err(StalgebraError::UnsupportedFormat(format!(
            "'{}' (supported: json, csv)",
            other
        ))),
    }
}

fn json_to_stdout(json: Result<String, serde_json::Error>) -> Result<(), StalgebraError> {
    let json = json.map_err(|source| StalgebraError::JsonWrite {
        path: PathBuf::from("<stdout>"),
        source,
    })?;
    println!("{}", json);
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), StalgebraError> {
    let mapping = read_detections(&args.input, &args.format)?;

    let opts = validation::ValidateOptions {
        strict: args.strict,
        ..Default::default()
    };
    let report = validation::validate_mapping(&mapping, &opts);

    match args.output.as_str() {
        "json" => json_to_stdout(report.to_json())?,
        _ => print!("{}", report),
    }

    let has_errors = report.error_count() > 0;
    let has_warnings = report.warning_count() > 0;

    if has_errors || (args.strict && has_warnings) {
        Err(StalgebraError::ValidationFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report,
        })
    } else {
        Ok(())
    }
}

fn run_inspect(args: InspectArgs) -> Result<(), StalgebraError> {
    let mapping = read_detections(&args.input, &args.format)?;

    let opts = inspect::InspectOptions {
        top_labels: args.top_labels,
        ..Default::default()
    };
    let report = inspect::inspect_mapping(&mapping, &opts);

    match args.output.as_str() {
        "json" => json_to_stdout(report.to_json()),
        _ => {
            print!("{}", report);
            Ok(())
        }
    }
}

fn run_query(args: QueryArgs) -> Result<(), StalgebraError> {
    let mapping = read_detections(&args.input, &args.format)?;
    let runtime = Runtime::new(RuntimeConfig::with_threads(args.threads))?;

    let min_score = args.min_score;
    let keep = move |i: &Interval<Detection>| {
        min_score.is_none_or(|min| i.payload.score.is_some_and(|s| s >= min))
    };

    let mut left = match &args.label {
        Some(label) => mapping.clone().filter(|i| &i.payload.label == label),
        None => mapping.clone(),
    }
    .filter(keep);
    if let Some(min) = args.min_length {
        left = left.filter_size(min, None);
    }
    if let Some(gap) = args.coalesce_gap {
        let touches = Axis::T.with_epsilon(gap).meets_or_overlaps();
        left = runtime.map_keys(left, |_, set| {
            Ok(set.coalesce_within(
                |a, b| a.payload.label == b.payload.label && touches.test(a, b),
                merge::combine_detections,
                gap,
            ))
        })?;
    }

    let (Some(with_label), Some(window)) = (&args.with_label, args.window) else {
        log::info!("query: {} detection(s) selected", left.total_len());
        return write_result(&left, args.output.as_deref());
    };

    let right = mapping.filter(|i| &i.payload.label == with_label).filter(keep);
    let predicate = if args.spatial_overlap {
        Axis::X.overlaps().and(Axis::Y.overlaps())
    } else {
        predicate::true_pred()
    };
    let pairs = join_keys(&runtime, left, &right, &predicate, window)?;
    log::info!("query: {} pair(s) joined", pairs.total_len());
    write_result(&pairs, args.output.as_deref())
}

/// Per-key join on the pool; keys missing on either side are dropped.
fn join_keys(
    runtime: &Runtime,
    left: DetectionMapping,
    right: &DetectionMapping,
    predicate: &BoundsPredicate,
    window: f64,
) -> Result<IntervalSetMapping<String, (Detection, Detection)>, StalgebraError> {
    let shared = IntervalSetMapping::from_map(
        left.into_iter()
            .filter(|(key, _)| right.contains_key(key))
            .collect(),
    );
    runtime.map_keys(shared, |key, set| {
        let other = right.get(key).ok_or_else(|| {
            StalgebraError::KeyMismatch(format!("key '{}' vanished during join", key))
        })?;
        Ok(set.join(other, |a, b| predicate.test(a, b), merge::span_pair, window))
    })
}

fn write_result<P: Serialize>(
    result: &IntervalSetMapping<String, P>,
    output: Option<&Path>,
) -> Result<(), StalgebraError> {
    match output {
        Some(path) => model::io_json::write_mapping_json(path, result),
        None => {
            let json = serde_json::to_string_pretty(result).map_err(|source| {
                StalgebraError::JsonWrite {
                    path: PathBuf::from("<stdout>"),
                    source,
                }
            })?;
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
            Ok(())
        }
    }
}
