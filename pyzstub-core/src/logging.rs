//! Logging setup shared by the binaries
//!
//! Everything goes to stderr. Stdout belongs to the interpreter (launcher) or
//! to the command result (bundler).

use std::io;

use tracing_subscriber::EnvFilter;

/// Environment variable that turns on launcher logging. Its value is an
/// `EnvFilter` directive such as `debug` or `pyzstub_core=trace`.
pub const LAUNCHER_LOG_ENV: &str = "PYZSTUB_LOG";

/// Install a stderr subscriber only if `var` is set.
///
/// Returns whether a subscriber was installed.
pub fn init_from_env(var: &str) -> bool {
    match std::env::var(var) {
        Ok(directive) if !directive.trim().is_empty() => {
            install(EnvFilter::new(directive.trim()))
        }
        _ => false,
    }
}

/// Install a stderr subscriber for a command-line tool. `RUST_LOG` wins,
/// otherwise `debug` when verbose and `warn` when not.
pub fn init_cli(verbose: bool) -> bool {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directive = cli_directive(rust_log.as_deref(), verbose);
    let filter = EnvFilter::try_new(&directive)
        .unwrap_or_else(|_| EnvFilter::new(fallback_directive(verbose)));
    install(filter)
}

/// Pick the filter directive for a command-line tool.
pub fn cli_directive(rust_log: Option<&str>, verbose: bool) -> String {
    match rust_log.map(str::trim) {
        Some(directive) if !directive.is_empty() => directive.to_string(),
        _ => fallback_directive(verbose).to_string(),
    }
}

fn fallback_directive(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}

fn install(filter: EnvFilter) -> bool {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}
