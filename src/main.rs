use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::{NamedSource, Report};
use svg2vd::batch::{self, BatchOptions, FileOutcome};
use tracing_subscriber::EnvFilter;

/// Convert SVG files to Android VectorDrawable XML
#[derive(Parser, Debug)]
#[command(name = "svg2vd", version)]
struct Cli {
    /// SVG file, or directory of SVG files
    #[arg(short, long, value_name = "PATH")]
    input: PathBuf,

    /// Directory the .xml drawables are written to
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,

    /// Also convert SVG files in subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Log conversion details
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn report_file(outcome: FileOutcome) {
    let name = outcome.input.display().to_string();
    match (&outcome.error, &outcome.output) {
        (None, Some(output)) => println!("✅ {name} -> {}", output.display()),
        _ => println!("❌ {name}"),
    }

    let source = outcome.source.unwrap_or_default();
    for warning in outcome.warnings {
        let report = Report::new(warning).with_source_code(NamedSource::new(&name, source.clone()));
        eprintln!("{report:?}");
    }
    if let Some(error) = outcome.error {
        let report = Report::new(error).with_source_code(NamedSource::new(&name, source));
        eprintln!("{report:?}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let options = BatchOptions {
        input: cli.input,
        output_dir: cli.output,
        recursive: cli.recursive,
    };
    let report = match batch::run(&options) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{:?}", Report::new(e));
            return ExitCode::FAILURE;
        }
    };

    let (converted, failed, warnings) = (report.converted(), report.failed(), report.warnings());
    for outcome in report.files {
        report_file(outcome);
    }
    println!("{converted} converted, {failed} failed, {warnings} warnings");
    ExitCode::SUCCESS
}
