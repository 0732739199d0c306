//! pyzstubw
//!
//! Windowed launcher. Same as `pyzstub`, but linked for the GUI subsystem so
//! no console window opens. The WinMain parameters are not needed; the
//! arguments come from the process command line.

#![windows_subsystem = "windows"] // configures /SUBSYSTEM:WINDOWS

use pyzstub_core::Subsystem;

fn main() {
    std::process::exit(pyzstub_core::launch(Subsystem::Windowed));
}
