//! pyzstub Bundle
//!
//! Packaging tool: appends a Python zip application to the launcher and
//! inspects the result. Logs go to stderr, results to stdout.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pyzstub_core::{bundle, inspect, logging, BundleConfig, BundleReport, InspectReport};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "pyzstub-bundle")]
#[command(about = "Turn a Python zip application into a native executable", long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Command,

    /// Print the report as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Append an archive to the launcher
    Bundle {
        /// Launcher executable (pyzstub or pyzstubw)
        #[arg(short, long, value_name = "EXE")]
        launcher: PathBuf,
        /// Zip application to embed
        #[arg(short, long, value_name = "PYZ")]
        archive: PathBuf,
        /// Output executable
        #[arg(short, long, value_name = "OUT")]
        output: PathBuf,
        /// Overwrite the output if it exists
        #[arg(short, long)]
        force: bool,
    },

    /// Show where the archive starts inside a bundled executable
    Inspect {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_cli(args.verbose);
    debug!("{:?}", args);

    let mut stdout = io::stdout();
    match args.command {
        Command::Bundle {
            launcher,
            archive,
            output,
            force,
        } => {
            let config = BundleConfig::new(launcher, archive, output).force(force);
            let report = bundle(&config)
                .with_context(|| format!("Failed to bundle {:?}", config.output))?;
            if args.json {
                writeln!(stdout, "{}", serde_json::to_string(&report)?)?;
            } else {
                print_bundle(&mut stdout, &report)?;
            }
        }
        Command::Inspect { file } => {
            let report =
                inspect(&file).with_context(|| format!("Failed to inspect {:?}", file))?;
            if args.json {
                writeln!(stdout, "{}", serde_json::to_string(&report)?)?;
            } else {
                print_inspect(&mut stdout, &report)?;
            }
        }
    }

    stdout.flush()?;
    info!("done");
    Ok(())
}

fn print_bundle(out: &mut impl Write, report: &BundleReport) -> io::Result<()> {
    writeln!(out, "Wrote {}", report.output.display())?;
    writeln!(out, "  launcher: {} bytes", report.launcher_len)?;
    writeln!(out, "  archive:  {} bytes", report.archive_len)?;
    writeln!(out, "  total:    {} bytes", report.total_len)
}

fn print_inspect(out: &mut impl Write, report: &InspectReport) -> io::Result<()> {
    writeln!(out, "{}", report.path.display())?;
    writeln!(out, "  size:           {} bytes", report.file_len)?;
    writeln!(out, "  payload offset: {}", report.payload_offset)?;
    writeln!(out, "  archive:        {} bytes", report.archive_len)?;
    writeln!(out, "  entries:        {}", report.entries)
}
