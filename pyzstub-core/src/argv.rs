//! Argument vector augmentation
//!
//! `Py_Main` treats `argv[1]` as the script to run. The launcher re-inserts its
//! own path in front of the original vector, so the interpreter executes the
//! launcher file itself (and with it the zip application appended to it).

use crate::error::{LaunchError, LaunchResult};

/// Build the augmented vector: `[v0, v0, v1, .., vn]`.
///
/// An empty input has no program name to duplicate and is rejected.
pub fn augment<T: Clone>(original: &[T]) -> LaunchResult<Vec<T>> {
    let program = original.first().ok_or(LaunchError::EmptyArgv)?;

    let mut augmented = Vec::with_capacity(original.len() + 1);
    augmented.push(program.clone());
    augmented.extend_from_slice(original);
    Ok(augmented)
}
