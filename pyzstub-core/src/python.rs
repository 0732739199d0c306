//! CPython entry point
//!
//! Links the interpreter through pyo3's FFI layer (limited API) and forwards
//! the prepared `argv` to `Py_Main`.

use std::os::raw::c_int;

use libc::wchar_t;
use tracing::warn;

use crate::launcher::EntryPoint;
use crate::wide::WideArgv;

extern "C" {
    // Part of the stable ABI; exported by both libpython3.x and python3.dll.
    fn Py_Main(argc: c_int, argv: *mut *mut wchar_t) -> c_int;
}

/// Runs a full interpreter session, the same way the `python` executable does.
pub struct PyMain;

impl EntryPoint for PyMain {
    fn call(&mut self, argv: &mut WideArgv) -> c_int {
        if unsafe { pyo3::ffi::Py_IsInitialized() } != 0 {
            warn!("Interpreter already initialized in this process; Py_Main will reuse it");
        }

        // SAFETY: `argv` owns `argc` NUL-terminated strings plus a trailing null
        // slot, and outlives the call.
        unsafe { Py_Main(argv.argc(), argv.as_mut_ptr()) }
    }
}
