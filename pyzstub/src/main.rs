//! pyzstub
//!
//! Console launcher. Runs the Python zip application appended to this
//! executable and exits with the interpreter's status.

use pyzstub_core::Subsystem;

fn main() {
    std::process::exit(pyzstub_core::launch(Subsystem::Console));
}
