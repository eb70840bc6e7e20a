//! Workspace automation tasks.
//!
//! Run with: `cargo xtask <command>`

#![allow(clippy::print_stdout)]

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use denial_catalog::storage::file::DEFAULT_DATA_PATH;

const CRATE_PREFIX: &str = "denial-";

#[derive(Parser)]
#[command(name = "xtask", about = "Denial catalog workspace automation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all CI checks locally
    Ci,
    /// Validate workspace conventions
    Lint,
    /// Generate coverage report
    Coverage,
    /// Write the API's OpenAPI document
    Openapi {
        /// Output path.
        #[arg(long, default_value = "openapi.json")]
        out: PathBuf,
    },
    /// Check a catalog document against the schema
    CheckCatalog {
        /// Catalog JSON file.
        #[arg(default_value = DEFAULT_DATA_PATH)]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci => run_ci(),
        Commands::Lint => run_lint(Path::new("crates")),
        Commands::Coverage => run_coverage(),
        Commands::Openapi { out } => write_openapi(&out),
        Commands::CheckCatalog { path } => check_catalog(&path),
    }
}

fn run_ci() -> Result<()> {
    println!("Running CI checks...\n");

    run_cmd("cargo", &["fmt", "--check"])?;
    run_cmd("cargo", &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])?;
    run_cmd("cargo", &["test", "--workspace"])?;
    run_cmd("cargo", &["doc", "--workspace", "--no-deps"])?;
    run_lint(Path::new("crates"))?;

    println!("\nAll CI checks passed!");
    Ok(())
}

/// Every crate is named `denial-*` and opts into the workspace lints.
fn run_lint(crates_dir: &Path) -> Result<()> {
    println!("Validating workspace conventions...\n");

    for entry in std::fs::read_dir(crates_dir)
        .with_context(|| format!("Failed to read {}", crates_dir.display()))?
    {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with(CRATE_PREFIX) {
            bail!("Crate '{name}' does not follow {CRATE_PREFIX}* naming");
        }

        let manifest = entry.path().join("Cargo.toml");
        let contents = std::fs::read_to_string(&manifest)
            .with_context(|| format!("Failed to read {}", manifest.display()))?;
        if !contents.contains("[lints]\nworkspace = true") {
            bail!("Crate '{name}' does not inherit workspace lints");
        }
    }

    println!("All conventions validated!");
    Ok(())
}

fn run_coverage() -> Result<()> {
    run_cmd("cargo", &["llvm-cov", "--workspace", "--html"])?;
    println!("\nCoverage report: target/llvm-cov/html/index.html");
    Ok(())
}

fn write_openapi(out: &Path) -> Result<()> {
    let json = denial_api::openapi::openapi_json().context("Failed to render OpenAPI")?;
    std::fs::write(out, json).with_context(|| format!("Failed to write {}", out.display()))?;
    println!("Wrote {}", out.display());
    Ok(())
}

fn check_catalog(path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("{} is not JSON", path.display()))?;
    let catalog = denial_catalog::schema::validate(&value)
        .with_context(|| format!("{} is not a valid catalog", path.display()))?;

    println!(
        "{}: {} categories, {} keywords",
        path.display(),
        catalog.categories.len(),
        catalog.keyword_count()
    );
    Ok(())
}

fn run_cmd(cmd: &str, args: &[&str]) -> Result<()> {
    println!("$ {} {}", cmd, args.join(" "));
    let status = Command::new(cmd)
        .args(args)
        .status()
        .with_context(|| format!("Failed to run: {} {}", cmd, args.join(" ")))?;

    if !status.success() {
        bail!("Command failed: {} {}", cmd, args.join(" "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_crate(root: &Path, name: &str, manifest: &str) -> Result<()> {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir)?;
        std::fs::write(dir.join("Cargo.toml"), manifest)?;
        Ok(())
    }

    #[test]
    fn lint_accepts_conforming_crates() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_crate(dir.path(), "denial-core", "[lints]\nworkspace = true\n")?;
        run_lint(dir.path())
    }

    #[test]
    fn lint_rejects_foreign_names_and_missing_lints() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_crate(dir.path(), "catalog-core", "[lints]\nworkspace = true\n")?;
        assert!(run_lint(dir.path()).is_err());

        let dir = tempfile::tempdir()?;
        write_crate(dir.path(), "denial-core", "[package]\nname = \"denial-core\"\n")?;
        assert!(run_lint(dir.path()).is_err());
        Ok(())
    }

    #[test]
    fn check_catalog_validates_shape() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let good = dir.path().join("good.json");
        std::fs::write(&good, r#"{"categories":[]}"#)?;
        check_catalog(&good)?;

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, r#"{"categories":{}}"#)?;
        assert!(check_catalog(&bad).is_err());
        Ok(())
    }
}
