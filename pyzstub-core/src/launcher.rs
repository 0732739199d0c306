//! Launcher
//!
//! Turns the process arguments into the augmented wide `argv` and hands it to
//! an embedded interpreter entry point exactly once.

use std::ffi::OsString;
use std::os::raw::c_int;

use tracing::debug;

use crate::argv::augment;
use crate::error::LaunchResult;
use crate::wide::WideArgv;

/// Exit code used when the arguments could not be prepared and the
/// interpreter was never started.
pub const LAUNCH_FAILURE_CODE: i32 = 1;

/// Which native entry convention the process was started through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsystem {
    Console,
    Windowed,
}

/// A "run the interpreter with these arguments" function.
///
/// Implementations block until the interpreter session ends and return its
/// status unmodified.
pub trait EntryPoint {
    fn call(&mut self, argv: &mut WideArgv) -> c_int;
}

impl<F> EntryPoint for F
where
    F: FnMut(&mut WideArgv) -> c_int,
{
    fn call(&mut self, argv: &mut WideArgv) -> c_int {
        self(argv)
    }
}

pub struct Launcher<E> {
    entry: E,
}

impl<E: EntryPoint> Launcher<E> {
    pub fn new(entry: E) -> Self {
        Self { entry }
    }

    /// Run the entry point with the augmented form of `args`.
    ///
    /// The returned status is the entry point's own result. An error means the
    /// entry point was not called.
    pub fn run<I, S>(&mut self, args: I) -> LaunchResult<i32>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let original: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let augmented = augment(&original)?;
        let mut argv = WideArgv::new(&augmented)?;

        debug!("Calling entry point: argc={}, argv={:?}", argv.argc(), augmented);
        let status = self.entry.call(&mut argv);
        debug!("Entry point returned {}", status);

        Ok(status)
    }

    pub fn into_inner(self) -> E {
        self.entry
    }
}
