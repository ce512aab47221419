//! Converting many files at once.
//!
//! Inputs are gathered up front, converted in parallel, and reported in
//! input order. A file that fails is recorded and the batch goes on.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use rayon::prelude::*;
use thiserror::Error;
use walkdir::WalkDir;

use crate::errors::{ConvertError, Warning};
use crate::log::{debug, warn};

/// What to convert and where to put it
#[derive(Clone, Debug)]
pub struct BatchOptions {
    /// A single SVG file or a directory of them
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Descend into subdirectories of `input`
    pub recursive: bool,
}

/// Problems that stop a batch before any file is converted
#[derive(Error, Diagnostic, Debug)]
pub enum BatchError {
    #[error("input {} does not exist", path.display())]
    #[diagnostic(code(svg2vd::batch::input_not_found))]
    InputNotFound { path: PathBuf },

    #[error("no SVG files found in {}", path.display())]
    #[diagnostic(
        code(svg2vd::batch::no_inputs),
        help("pass -r to search subdirectories")
    )]
    NoInputs { path: PathBuf },

    #[error("cannot create output directory {}", path.display())]
    #[diagnostic(code(svg2vd::batch::create_output_dir))]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why one file of a batch produced no output
#[derive(Error, Diagnostic, Debug)]
pub enum FileError {
    #[error("cannot read {}", path.display())]
    #[diagnostic(code(svg2vd::batch::read))]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write {}", path.display())]
    #[diagnostic(code(svg2vd::batch::write))]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Convert(#[from] ConvertError),
}

/// Result of converting one input file
#[derive(Debug)]
pub struct FileOutcome {
    pub input: PathBuf,
    /// Where the drawable was written, when it was
    pub output: Option<PathBuf>,
    /// Source text, kept so diagnostics can quote it
    pub source: Option<String>,
    pub warnings: Vec<Warning>,
    pub error: Option<FileError>,
}

impl FileOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn converted(&self) -> usize {
        self.files.iter().filter(|f| f.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.files.len() - self.converted()
    }

    pub fn warnings(&self) -> usize {
        self.files.iter().map(|f| f.warnings.len()).sum()
    }
}

fn is_svg(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

/// SVG files named by `input`, sorted.
///
/// A file is taken as is, whatever its extension. A directory yields its
/// `.svg` files, and with `recursive` those of its subdirectories too.
pub fn collect_inputs(input: &Path, recursive: bool) -> Result<Vec<PathBuf>, BatchError> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(BatchError::InputNotFound {
            path: input.to_path_buf(),
        });
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files: Vec<PathBuf> = WalkDir::new(input)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_svg(entry.path()))
        .map(|entry| entry.into_path())
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(BatchError::NoInputs {
            path: input.to_path_buf(),
        });
    }
    Ok(files)
}

/// Output location for `file`: its path relative to `root`, under
/// `output_dir`, with an `.xml` extension
fn output_path(root: &Path, file: &Path, output_dir: &Path) -> PathBuf {
    let relative = match file.strip_prefix(root) {
        Ok(rel) if !rel.as_os_str().is_empty() => rel,
        _ => Path::new(file.file_name().unwrap_or(file.as_os_str())),
    };
    output_dir.join(relative).with_extension("xml")
}

fn convert_file(input: &Path, output: &Path) -> FileOutcome {
    let mut outcome = FileOutcome {
        input: input.to_path_buf(),
        output: None,
        source: None,
        warnings: Vec::new(),
        error: None,
    };

    let source = match fs::read_to_string(input) {
        Ok(source) => source,
        Err(source) => {
            outcome.error = Some(FileError::Read {
                path: input.to_path_buf(),
                source,
            });
            return outcome;
        }
    };

    let result = crate::convert(&source);
    outcome.source = Some(source);
    let conversion = match result {
        Ok(conversion) => conversion,
        Err(e) => {
            outcome.error = Some(e.into());
            return outcome;
        }
    };
    outcome.warnings = conversion.warnings;

    let written = output
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| fs::write(output, conversion.document.to_xml()));
    match written {
        Ok(()) => outcome.output = Some(output.to_path_buf()),
        Err(source) => {
            outcome.error = Some(FileError::Write {
                path: output.to_path_buf(),
                source,
            })
        }
    }
    outcome
}

/// Convert every input of `options`, writing one `.xml` per SVG.
pub fn run(options: &BatchOptions) -> Result<BatchReport, BatchError> {
    let inputs = collect_inputs(&options.input, options.recursive)?;
    fs::create_dir_all(&options.output_dir).map_err(|source| BatchError::CreateOutputDir {
        path: options.output_dir.clone(),
        source,
    })?;
    debug!(count = inputs.len(), "converting");

    let root = if options.input.is_dir() {
        options.input.as_path()
    } else {
        options.input.parent().unwrap_or(Path::new(""))
    };
    let files = inputs
        .par_iter()
        .map(|input| convert_file(input, &output_path(root, input, &options.output_dir)))
        .collect();
    Ok(BatchReport { files })
}
