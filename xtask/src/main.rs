//! Custom cargo commands for the docstore crate.
//!
//! Usage:
//!   cargo xtask verify        - Tests, clippy, CLI smoke run
//!   cargo xtask test          - Run all tests
//!   cargo xtask check         - Quick check (check + test + clippy)
//!   cargo xtask smoke         - Build and inspect a generated corpus with the CLI
//!   cargo xtask fuzz [secs]   - Run every fuzz target for a while (nightly)
//!   cargo xtask bench         - Run benchmarks

use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Fuzz targets declared in fuzz/Cargo.toml
const FUZZ_TARGETS: &[&str] = &[
    "varint_codec",
    "mapping_parsing",
    "index_parsing",
    "scanner_splits",
];

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let task = args.next();
    match task.as_deref() {
        Some("verify") => verify()?,
        Some("test") => test()?,
        Some("check") => check()?,
        Some("smoke") => smoke()?,
        Some("fuzz") => {
            let secs = match args.next() {
                Some(s) => s.parse().context("fuzz duration must be seconds")?,
                None => 30,
            };
            fuzz(secs)?
        }
        Some("bench") => bench()?,
        _ => print_help(),
    }
    Ok(())
}

fn print_help() {
    eprintln!(
        r#"
cargo xtask <COMMAND>

Commands:
  verify        Run full verification suite (tests + clippy + smoke)
  test          Run all Rust tests
  check         Quick check (cargo check + test + clippy)
  smoke         Build a generated corpus with the CLI and inspect the output
  fuzz [secs]   Run each fuzz target for `secs` seconds (default 30, needs nightly)
  bench         Run benchmarks
"#
    );
}

/// Full verification suite
fn verify() -> Result<()> {
    println!("==========================================");
    println!("docstore Verification Suite");
    println!("==========================================\n");

    println!("[1/4] Checking fuzz targets...");
    check_fuzz_targets()?;
    println!("✓ Fuzz targets present\n");

    println!("[2/4] Running Rust tests...");
    run_cargo(&["test", "--quiet"])?;
    println!("✓ All Rust tests passed\n");

    println!("[3/4] Running clippy...");
    run_cargo(&["clippy", "--quiet", "--", "-D", "warnings"])?;
    println!("✓ Clippy passed\n");

    println!("[4/4] CLI smoke run...");
    smoke()?;
    println!("✓ CLI builds and reads a corpus\n");

    println!("==========================================");
    println!("✓ ALL VERIFICATION CHECKS PASSED");
    println!("==========================================");

    Ok(())
}

/// Run all tests
fn test() -> Result<()> {
    run_cargo(&["test"])
}

/// Quick check
fn check() -> Result<()> {
    println!("Running quick checks...\n");

    println!("[1/3] cargo check...");
    run_cargo(&["check"])?;

    println!("[2/3] cargo test...");
    run_cargo(&["test", "--quiet"])?;

    println!("[3/3] cargo clippy...");
    run_cargo(&["clippy", "--quiet", "--", "-D", "warnings"])?;

    println!("\n✓ Quick checks passed");
    Ok(())
}

/// Write a small corpus under target/smoke, then build, fetch and inspect
/// it through the release binary.
fn smoke() -> Result<()> {
    let root = project_root()?;
    let dir = root.join("target/smoke");
    let corpus = dir.join("corpus");
    let output = dir.join("out");
    if dir.exists() {
        fs::remove_dir_all(&dir).context("Failed to clear target/smoke")?;
    }
    fs::create_dir_all(&corpus)?;
    write_smoke_corpus(&corpus)?;

    let corpus_arg = path_arg(&corpus)?;
    let output_arg = path_arg(&output)?;
    let mapping_arg = path_arg(&output.join("docnos.dat"))?;
    let index_arg = path_arg(&output.join("index.dat"))?;

    run_cargo(&[
        "run", "--quiet", "--release", "--", "build", "-i", &corpus_arg, "-o", &output_arg,
        "--block-size", "4", "--split-size", "4096",
    ])?;
    run_cargo(&["run", "--quiet", "--release", "--", "inspect", &index_arg])?;
    run_cargo(&[
        "run", "--quiet", "--release", "--", "fetch", &index_arg, "-m", &mapping_arg,
        "--docid", "SMOKE-1-0042",
    ])?;
    Ok(())
}

fn write_smoke_corpus(dir: &Path) -> Result<()> {
    for file in 0..3 {
        let mut text = String::new();
        for doc in 0..100 {
            text.push_str(&format!(
                "<DOC>\n<DOCNO> SMOKE-{}-{:04} </DOCNO>\n<TEXT>\nDocument {} of file {}.\n</TEXT>\n</DOC>\n",
                file, doc, doc, file
            ));
        }
        fs::write(dir.join(format!("part-{}.trec", file)), text)?;
    }
    Ok(())
}

/// Run each fuzz target for `secs` seconds
fn fuzz(secs: u64) -> Result<()> {
    let root = project_root()?;
    let max_time = format!("-max_total_time={}", secs);
    for target in FUZZ_TARGETS {
        println!("fuzzing {} for {}s...", target, secs);
        let status = Command::new("cargo")
            .args(["+nightly", "fuzz", "run", target, "--", &max_time])
            .current_dir(&root)
            .status()
            .with_context(|| format!("Failed to run cargo fuzz for {}", target))?;
        if !status.success() {
            bail!("fuzz target {} failed", target);
        }
    }
    Ok(())
}

/// Run benchmarks
fn bench() -> Result<()> {
    run_cargo(&["bench"])
}

// ============================================================================
// Helper functions
// ============================================================================

fn project_root() -> Result<PathBuf> {
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => env::current_dir().context("Failed to read current directory")?,
    };

    // xtask is in project_root/xtask, so go up one level
    let root = manifest_dir.parent().unwrap_or(&manifest_dir);
    Ok(root.to_path_buf())
}

fn path_arg(path: &Path) -> Result<String> {
    path.to_str()
        .map(str::to_string)
        .with_context(|| format!("Non UTF-8 path: {}", path.display()))
}

fn run_cargo(args: &[&str]) -> Result<()> {
    let root = project_root()?;

    let status = Command::new("cargo")
        .args(args)
        .current_dir(&root)
        .status()
        .with_context(|| format!("Failed to run cargo {:?}", args))?;

    if !status.success() {
        bail!("cargo {:?} failed", args);
    }

    Ok(())
}

fn check_fuzz_targets() -> Result<()> {
    let root = project_root()?;
    let manifest = fs::read_to_string(root.join("fuzz/Cargo.toml"))
        .context("Failed to read fuzz/Cargo.toml")?;

    for target in FUZZ_TARGETS {
        let source = root.join(format!("fuzz/fuzz_targets/{}.rs", target));
        if !source.exists() {
            bail!("Missing fuzz target source {}", source.display());
        }
        if !manifest.contains(&format!("name = \"{}\"", target)) {
            bail!("Fuzz target {} is not declared in fuzz/Cargo.toml", target);
        }
    }

    Ok(())
}
