//! pyzstub Core Library
//!
//! Core functionality for the pyzstub launcher:
//! - Argument vector augmentation and wide-string conversion
//! - The launcher and its `EntryPoint` seam
//! - Bundling a zip application onto the launcher
//! - CPython entry point (`Py_Main`, optional)

pub mod argv;
pub mod bundle;
pub mod error;
pub mod launcher;
pub mod logging;
pub mod wide;

#[cfg(feature = "python")]
mod python;

pub use bundle::{bundle, inspect, BundleConfig, BundleReport, InspectReport};
pub use error::{BundleError, LaunchError};
pub use launcher::{EntryPoint, Launcher, Subsystem, LAUNCH_FAILURE_CODE};
#[cfg(feature = "python")]
pub use python::PyMain;
pub use wide::WideArgv;

/// Process entry shared by the console and windowed launchers.
///
/// Reads the process arguments, runs them through `Py_Main` and returns the
/// exit code for the process.
#[cfg(feature = "python")]
pub fn launch(subsystem: Subsystem) -> i32 {
    logging::init_from_env(logging::LAUNCHER_LOG_ENV);
    tracing::debug!("pyzstub starting ({:?} subsystem)", subsystem);

    match Launcher::new(PyMain).run(std::env::args_os()) {
        Ok(status) => status,
        Err(e) => {
            tracing::error!("Launch failed: {}", e);
            eprintln!("pyzstub: {}", e);
            LAUNCH_FAILURE_CODE
        }
    }
}
