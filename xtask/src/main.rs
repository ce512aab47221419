use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: cargo xtask <command>");
        eprintln!("Commands:");
        eprintln!("  bless    Regenerate expected .xml output for tests/fixtures");
        std::process::exit(1);
    }

    match args[1].as_str() {
        "bless" => bless(),
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            std::process::exit(1);
        }
    }
}

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../tests/fixtures")
}

fn bless() {
    let mut entries: Vec<PathBuf> = fs::read_dir(fixtures_dir())
        .expect("Failed to read fixtures directory")
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "svg"))
        .filter(|p| {
            !p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("error_"))
        })
        .collect();
    entries.sort();

    let results: Vec<(PathBuf, Result<usize, String>)> = entries
        .par_iter()
        .map(|path| {
            let result = fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|source| svg2vd::convert(&source).map_err(|e| e.to_string()))
                .and_then(|conversion| {
                    let warnings = conversion.warnings.len();
                    fs::write(path.with_extension("xml"), conversion.document.to_xml())
                        .map(|()| warnings)
                        .map_err(|e| e.to_string())
                });
            (path.clone(), result)
        })
        .collect();

    let mut failed = 0;
    for (path, result) in &results {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        match result {
            Ok(0) => eprintln!("✅ {name}"),
            Ok(warnings) => eprintln!("✅ {name} ({warnings} warnings)"),
            Err(e) => {
                failed += 1;
                eprintln!("❌ {name}: {e}");
            }
        }
    }
    eprintln!("Blessed {} of {} fixtures", results.len() - failed, results.len());
    if failed > 0 {
        std::process::exit(1);
    }
}
