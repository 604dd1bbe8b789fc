//! Crop2ML package tools.
//!
//! Provides the `cropm` binary for working with model packages without the
//! studio server: list packages and models, export a package to a zip,
//! import a zip, and transpile a package through pycropml.
//!
//! Uses the same `cropm_core` package and archive functions as the HTTP
//! server, so both entry points see packages identically.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use cropm_core::{archive, package, CoreError, TranspileTarget};
use cropm_toolkit::{ModelToolkit, PycropmlToolkit};

/// Crop2ML package tools.
#[derive(Parser)]
#[command(name = "cropm", about = "Crop2ML package tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List the packages under a package root.
    Packages {
        /// Package root directory.
        #[arg(short, long, default_value = "./packages")]
        root: PathBuf,
    },

    /// List the model files of a package.
    Models {
        /// Package directory.
        package: PathBuf,
    },

    /// Zip a package.
    Export {
        /// Package directory.
        package: PathBuf,

        /// Output file (default: ./<package>.zip).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract a zipped package into a package root.
    Import {
        /// Zip archive to import.
        archive: PathBuf,

        /// Package root directory.
        #[arg(short, long, default_value = "./packages")]
        root: PathBuf,
    },

    /// Transpile a package to languages or platforms.
    Transform {
        /// Package directory.
        package: PathBuf,

        /// Target code or name (java, cs, f90, py, r, cpp, simplace, ...).
        #[arg(short, long = "target", required = true)]
        targets: Vec<TranspileTarget>,

        /// Convert a platform component back to Crop2ML instead.
        #[arg(long)]
        reverse: bool,

        /// Python interpreter with pycropml installed.
        #[arg(long, default_value = "python3")]
        python: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Packages { root } => run_packages(&root),
        Commands::Models { package } => run_models(&package),
        Commands::Export { package, output } => run_export(&package, output),
        Commands::Import { archive, root } => run_import(&archive, &root),
        Commands::Transform {
            package,
            targets,
            reverse,
            python,
        } => run_transform(&package, &targets, reverse, python),
    };
    process::exit(exit_code);
}

/// Exit code for a core error: 3 for I/O, 1 otherwise.
fn report(context: &str, err: &CoreError) -> i32 {
    eprintln!("Error: {context}: {err}");
    match err {
        CoreError::Io(_) => 3,
        _ => 1,
    }
}

fn print_json(value: &serde_json::Value) {
    let json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize result: {e}\"}}"));
    println!("{json}");
}

fn run_packages(root: &Path) -> i32 {
    match package::list_packages(root) {
        Ok(packages) => {
            let packages: Vec<String> = packages.iter().map(|p| p.display().to_string()).collect();
            print_json(&serde_json::json!({ "packages": packages }));
            0
        }
        Err(e) => report(&format!("cannot list {}", root.display()), &e),
    }
}

fn run_models(package: &Path) -> i32 {
    if !package::is_package(package) {
        eprintln!("Error: {} is not a package", package.display());
        return 1;
    }
    match package::list_models(package) {
        Ok(models) => {
            print_json(&serde_json::json!({ "models": models }));
            0
        }
        Err(e) => report(&format!("cannot list {}", package.display()), &e),
    }
}

/// Execute the export subcommand.
///
/// Returns exit code: 0 = success, 1 = not a directory, 3 = I/O error.
fn run_export(package: &Path, output: Option<PathBuf>) -> i32 {
    if !package.is_dir() {
        eprintln!("Error: directory not found: {}", package.display());
        return 1;
    }
    let bytes = match archive::zip_package(package) {
        Ok(bytes) => bytes,
        Err(e) => return report("cannot zip package", &e),
    };
    let output =
        output.unwrap_or_else(|| PathBuf::from(format!("{}.zip", package::package_name(package))));
    if let Err(e) = fs::write(&output, &bytes) {
        eprintln!("Error: cannot write {}: {e}", output.display());
        return 3;
    }
    println!("{}", output.display());
    0
}

fn run_import(archive_path: &Path, root: &Path) -> i32 {
    let bytes = match fs::read(archive_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error: cannot read {}: {e}", archive_path.display());
            return 3;
        }
    };
    if let Err(e) = fs::create_dir_all(root) {
        eprintln!("Error: cannot create {}: {e}", root.display());
        return 3;
    }
    match archive::extract_archive(&bytes, root) {
        Ok(files) => {
            let files: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
            print_json(&serde_json::json!({ "files": files }));
            0
        }
        Err(e) => report("cannot import archive", &e),
    }
}

/// Execute the transform subcommand.
///
/// Every target is attempted; returns 1 if any of them failed.
fn run_transform(
    package: &Path,
    targets: &[TranspileTarget],
    reverse: bool,
    python: PathBuf,
) -> i32 {
    let mut toolkit = PycropmlToolkit::new(python);
    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for &target in targets {
        let result = if reverse {
            toolkit.transpile_component(package, package, target)
        } else {
            toolkit.transpile_package(package, target)
        };
        match result {
            Ok(()) => successes.push(target.code()),
            Err(e) => errors.push(format!("Error transpiling to {target}: {e}")),
        }
    }

    for err in &errors {
        eprintln!("  - {err}");
    }
    print_json(&serde_json::json!({
        "successes": successes,
        "errors": errors,
    }));
    if errors.is_empty() {
        0
    } else {
        1
    }
}
