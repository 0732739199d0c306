//! Wide-character argument vectors
//!
//! Converts OS arguments into the NUL-terminated `wchar_t` strings and the
//! pointer array that `Py_Main` expects. The buffer owns every string, so the
//! pointers stay valid for as long as the `WideArgv` is alive.

use std::ffi::OsStr;
use std::os::raw::c_int;
use std::ptr;

use libc::wchar_t;

use crate::error::{LaunchError, LaunchResult};

/// Encode one argument as a NUL-terminated wide string.
///
/// Windows arguments are UTF-16 already. On Unix, undecodable bytes are
/// mapped to lone surrogates `U+DC80..U+DCFF`, the same way the interpreter
/// decodes its own command line.
pub fn to_wide(arg: &OsStr, index: usize) -> LaunchResult<Vec<wchar_t>> {
    let mut units = encode(arg);
    if units.contains(&0) {
        return Err(LaunchError::InteriorNul { index });
    }
    units.push(0);
    Ok(units)
}

#[cfg(windows)]
fn encode(arg: &OsStr) -> Vec<wchar_t> {
    use std::os::windows::ffi::OsStrExt;

    arg.encode_wide().map(|unit| unit as wchar_t).collect()
}

#[cfg(unix)]
fn encode(arg: &OsStr) -> Vec<wchar_t> {
    use std::os::unix::ffi::OsStrExt;

    let mut units = Vec::with_capacity(arg.len());
    for chunk in arg.as_bytes().utf8_chunks() {
        units.extend(chunk.valid().chars().map(|c| c as wchar_t));
        units.extend(
            chunk
                .invalid()
                .iter()
                .map(|&byte| (0xDC00 + u32::from(byte)) as wchar_t),
        );
    }
    units
}

/// An owned `argv` in the layout C entry points expect: `argc` string
/// pointers followed by a null pointer.
pub struct WideArgv {
    // Keeps the strings alive; `pointers` refers into these buffers.
    storage: Vec<Vec<wchar_t>>,
    pointers: Vec<*mut wchar_t>,
    argc: c_int,
}

impl WideArgv {
    pub fn new<S: AsRef<OsStr>>(args: &[S]) -> LaunchResult<Self> {
        let argc = c_int::try_from(args.len()).map_err(|_| LaunchError::TooManyArguments {
            count: args.len(),
        })?;

        let mut storage = args
            .iter()
            .enumerate()
            .map(|(index, arg)| to_wide(arg.as_ref(), index))
            .collect::<LaunchResult<Vec<_>>>()?;

        let mut pointers: Vec<*mut wchar_t> =
            storage.iter_mut().map(|arg| arg.as_mut_ptr()).collect();
        pointers.push(ptr::null_mut());

        Ok(Self {
            storage,
            pointers,
            argc,
        })
    }

    pub fn argc(&self) -> c_int {
        self.argc
    }

    /// Pointer to the first slot. Valid while `self` is alive and not moved
    /// out of its frame.
    pub fn as_mut_ptr(&mut self) -> *mut *mut wchar_t {
        self.pointers.as_mut_ptr()
    }

    /// The encoded argument at `index`, without its terminator.
    pub fn get(&self, index: usize) -> Option<&[wchar_t]> {
        self.storage
            .get(index)
            .map(|units| &units[..units.len() - 1])
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}
