//! retrofit - template-aware button vocabulary migration
//!
//! This is the main CLI entry point: it loads the migration, collects
//! files, migrates them in parallel and prints the report.

mod cli;

use std::io::{self, BufRead, Read, Write};
use std::path::Path;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context};
use strum::VariantNames;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use retrofit_core::{
    expand_globs, filter_supported_files, format_reports, process_files_parallel, Engine,
    FileKind, FileStatus, LocatorKind, Migration, Migrator, ReportFormat,
};

use clap::Parser;
use cli::Args;

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_migration(path: Option<&Path>) -> anyhow::Result<Migration> {
    match path {
        Some(path) => Migration::load(path)
            .with_context(|| format!("invalid migration {}", path.display())),
        None => Ok(Migration::builtin().clone()),
    }
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    let format = ReportFormat::from_str(&args.output).ok_or_else(|| {
        anyhow!(
            "invalid format '{}'. Valid formats: {}",
            args.output,
            ReportFormat::valid_formats().join(", ")
        )
    })?;
    let locator = LocatorKind::from_str(&args.locator)
        .map_err(|_| {
            anyhow!(
                "invalid locator '{}'. Valid locators: {}",
                args.locator,
                LocatorKind::VARIANTS.join(", ")
            )
        })?;
    let stdin_kind = args
        .stdin_kind
        .as_deref()
        .map(|kind| {
            FileKind::from_str(kind)
                .map_err(|_| anyhow!("invalid stdin kind '{}'. Valid kinds: html, ts, tsx", kind))
        })
        .transpose()?;

    let migration = load_migration(args.migration.as_deref())?;
    debug!(migration = %migration.name, "loaded migration");
    let engine = Engine::try_new(migration).context("invalid migration")?;
    let migrator = Migrator::new(engine, locator);

    // Source text on stdin: transform to stdout, no report
    if let Some(kind) = stdin_kind {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        let rewrite = migrator.migrate_text(&source, kind)?;
        io::stdout().write_all(rewrite.text.as_bytes())?;
        let code = if !rewrite.diagnostics.is_empty() {
            ExitCode::FAILURE
        } else if args.check && rewrite.text != source {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
        return Ok(code);
    }

    // Collect files
    let mut files: Vec<String> = expand_globs(&args.files);

    if files.is_empty() && !atty::is(atty::Stream::Stdin) {
        // Read file paths from stdin
        for line in io::stdin().lock().lines() {
            let path = line?;
            let path = path.trim();
            if !path.is_empty() {
                files.push(path.to_string());
            }
        }
    }

    files = filter_supported_files(files);

    if files.is_empty() {
        eprintln!("Usage: retrofit <files...> [OPTIONS]");
        eprintln!("   or: cat page.html | retrofit --stdin-kind html");
        eprintln!("   or: git ls-files '*.ts' | retrofit --write");
        eprintln!("\nUse --help for more information.");
        bail!("no input files");
    }

    // Configure thread pool
    let concurrency = args.concurrency.unwrap_or_else(num_cpus::get);
    rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency)
        .build_global()
        .ok();

    let reports = process_files_parallel(&files, &migrator, args.write);
    print!("{}", format_reports(&reports, format));

    let failed = reports.iter().any(|r| r.status == FileStatus::Failed);
    let pending = reports.iter().any(|r| r.status == FileStatus::Changed && !r.written);

    Ok(if failed || (args.check && pending) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
