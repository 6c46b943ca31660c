// xtask - development automation for the nes-core workspace
//
// cargo run -p xtask -- <ci | fmt | clippy | test | bench>

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "x", about = "Development automation for nes-core")]
struct Cli {
    #[command(subcommand)]
    command: Task,
}

#[derive(Subcommand)]
enum Task {
    /// Format check, clippy, then unit, integration and doc tests
    Ci,
    /// Format code
    Fmt {
        #[arg(long)]
        check: bool,
    },
    /// Lint every target with warnings denied
    Clippy {
        #[arg(long)]
        fix: bool,
    },
    /// Run tests, optionally narrowed to one or more subsystems
    Test {
        #[arg(long)]
        doc: bool,
        /// Also run the ROM-backed tests that are ignored by default
        #[arg(long)]
        ignored: bool,
        #[arg(long)]
        cpu: bool,
        #[arg(long)]
        ppu: bool,
        #[arg(long)]
        mapper: bool,
    },
    /// Run criterion benchmarks matching an optional filter
    Bench { filter: Option<String> },
}

/// Lib test path prefix and integration test target for one subsystem
type Subsystem = (&'static str, &'static str, Option<&'static str>);

const CPU: Subsystem = ("CPU", "cpu::", Some("cpu_tests"));
const PPU: Subsystem = ("PPU", "ppu::", None);
const MAPPER: Subsystem = ("Mapper", "cartridge::", Some("mapper_tests"));

fn main() -> Result<()> {
    match Cli::parse().command {
        Task::Ci => ci(),
        Task::Fmt { check } => fmt(check),
        Task::Clippy { fix } => clippy(fix),
        Task::Test {
            doc,
            ignored,
            cpu,
            ppu,
            mapper,
        } => {
            if doc {
                return cargo(&["test", "-p", "nes-core", "--doc"]);
            }
            let picked: Vec<Subsystem> = [(cpu, CPU), (ppu, PPU), (mapper, MAPPER)]
                .into_iter()
                .filter(|(on, _)| *on)
                .map(|(_, subsystem)| subsystem)
                .collect();
            test(&picked, ignored)
        }
        Task::Bench { filter } => match filter {
            Some(filter) => cargo(&["bench", "-p", "nes-core", "--", filter.as_str()]),
            None => cargo(&["bench", "-p", "nes-core"]),
        },
    }
}

fn ci() -> Result<()> {
    println!("{}", "=== nes-core CI ===".bold().blue());
    let start = Instant::now();

    let steps: [(&str, fn() -> Result<()>); 4] = [
        ("fmt --check", || fmt(true)),
        ("clippy", || clippy(false)),
        ("tests", || test(&[], false)),
        ("doc tests", || cargo(&["test", "-p", "nes-core", "--doc"])),
    ];
    for (name, step) in steps {
        timed(name, step)?;
    }

    println!(
        "\n{} {}",
        "✓ CI passed in".green().bold(),
        format!("{:.2}s", start.elapsed().as_secs_f64()).bold()
    );
    Ok(())
}

fn fmt(check: bool) -> Result<()> {
    if check {
        cargo(&["fmt", "--all", "--", "--check"])
    } else {
        cargo(&["fmt", "--all"])
    }
}

fn clippy(fix: bool) -> Result<()> {
    if fix {
        cargo(&["clippy", "--workspace", "--all-targets", "--fix", "--allow-dirty"])
    } else {
        cargo(&["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])
    }
}

/// Run the whole suite when `subsystems` is empty, otherwise each one in
/// turn, reporting every failure before giving up
fn test(subsystems: &[Subsystem], ignored: bool) -> Result<()> {
    let extra: &[&str] = if ignored { &["--", "--ignored"] } else { &[] };
    let run = |args: &[&str]| {
        let mut full = vec!["test", "-p", "nes-core"];
        full.extend_from_slice(args);
        full.extend_from_slice(extra);
        cargo(&full)
    };

    if subsystems.is_empty() {
        return run(&[]);
    }

    let mut failed = Vec::new();
    for &(name, lib_filter, target) in subsystems {
        println!("{} {} tests", "→".blue(), name.bold());
        let passed = run(&["--lib", lib_filter])
            .and_then(|()| target.map_or(Ok(()), |target| run(&["--test", target])));
        if let Err(e) = passed {
            if subsystems.len() == 1 {
                return Err(e);
            }
            println!("{} {}: {}\n", "✗".red(), name, e);
            failed.push(name);
        }
    }

    if !failed.is_empty() {
        bail!("{} tests failed", failed.join(", "));
    }
    Ok(())
}

fn timed(name: &str, step: fn() -> Result<()>) -> Result<()> {
    println!("{} {}", "→".blue(), name);
    let start = Instant::now();
    step().inspect_err(|_| println!("{} {}", "✗".red().bold(), name))?;
    println!(
        "{} {} ({:.2}s)",
        "✓".green().bold(),
        name,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn cargo(args: &[&str]) -> Result<()> {
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        bail!("cargo {} exited with {}", args.join(" "), status);
    }
    Ok(())
}
