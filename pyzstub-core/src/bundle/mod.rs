//! Bundling
//!
//! A runnable application is the launcher executable with a Python zip
//! application appended to it. The launcher passes its own path to the
//! interpreter as the script, and the interpreter finds the archive through
//! its trailing central directory.

use std::fs::{self, File};
use std::io::{Cursor, Read, Seek, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};
use zip::ZipArchive;

use crate::error::{BundleError, BundleResult};

/// Configuration for a bundle
#[derive(Debug, Clone)]
pub struct BundleConfig {
    /// Launcher executable to prepend
    pub launcher: PathBuf,
    /// Zip application (`.pyz`), optionally starting with a shebang line
    pub archive: PathBuf,
    /// Where to write the bundled executable
    pub output: PathBuf,
    /// Overwrite `output` if it exists
    pub force: bool,
}

impl BundleConfig {
    pub fn new(
        launcher: impl Into<PathBuf>,
        archive: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            launcher: launcher.into(),
            archive: archive.into(),
            output: output.into(),
            force: false,
        }
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Result of a bundle
#[derive(Debug, Clone, Serialize)]
pub struct BundleReport {
    pub output: PathBuf,
    pub launcher_len: u64,
    pub archive_len: u64,
    pub total_len: u64,
}

/// What `inspect` found in a bundled executable
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub path: PathBuf,
    pub file_len: u64,
    /// Bytes in front of the archive, i.e. the launcher
    pub payload_offset: u64,
    /// Bytes from the payload offset to the end of the file
    pub archive_len: u64,
    pub entries: usize,
}

/// Write `launcher ++ archive` to the configured output
pub fn bundle(config: &BundleConfig) -> BundleResult<BundleReport> {
    // 1. Validate the archive
    let archive = read(&config.archive)?;
    let entries = open_archive(Cursor::new(&archive))
        .map_err(|_| BundleError::NotAnArchive {
            path: config.archive.clone(),
        })?
        .len();
    debug!("Archive {:?}: {} entries", config.archive, entries);

    // 2. Refuse to clobber an input or an existing file
    if config.output.exists() {
        if same_file(&config.output, &config.launcher)?
            || same_file(&config.output, &config.archive)?
        {
            return Err(BundleError::SameFile {
                path: config.output.clone(),
            });
        }
        if !config.force {
            return Err(BundleError::OutputExists {
                path: config.output.clone(),
            });
        }
    }

    // 3. Concatenate
    let launcher = read(&config.launcher)?;
    write_bundle(&config.output, &launcher, &archive)?;

    let report = BundleReport {
        output: config.output.clone(),
        launcher_len: launcher.len() as u64,
        archive_len: archive.len() as u64,
        total_len: (launcher.len() + archive.len()) as u64,
    };
    info!(
        "Bundled {:?} ({} bytes) + {:?} ({} bytes) -> {:?}",
        config.launcher, report.launcher_len, config.archive, report.archive_len, report.output
    );
    Ok(report)
}

/// Locate the archive appended to a bundled executable
pub fn inspect(path: &Path) -> BundleResult<InspectReport> {
    let file = File::open(path).map_err(|e| BundleError::io(path, e))?;
    let file_len = file
        .metadata()
        .map_err(|e| BundleError::io(path, e))?
        .len();

    let archive = open_archive(file).map_err(|e| {
        debug!("No archive in {:?}: {}", path, e);
        BundleError::NoPayload {
            path: path.to_path_buf(),
        }
    })?;

    Ok(InspectReport {
        path: path.to_path_buf(),
        file_len,
        payload_offset: archive.offset(),
        archive_len: file_len.saturating_sub(archive.offset()),
        entries: archive.len(),
    })
}

fn open_archive<R: Read + Seek>(reader: R) -> zip::result::ZipResult<ZipArchive<R>> {
    ZipArchive::new(reader)
}

fn read(path: &Path) -> BundleResult<Vec<u8>> {
    fs::read(path).map_err(|e| BundleError::io(path, e))
}

fn same_file(a: &Path, b: &Path) -> BundleResult<bool> {
    // A missing input is reported when it is read
    let Ok(b) = fs::canonicalize(b) else {
        return Ok(false);
    };
    let a = fs::canonicalize(a).map_err(|e| BundleError::io(a, e))?;
    Ok(a == b)
}

/// Write into a temporary file next to `output` and rename it into place,
/// so a failed write never leaves a truncated executable behind.
fn write_bundle(output: &Path, launcher: &[u8], archive: &[u8]) -> BundleResult<()> {
    let io_err = |e| BundleError::io(output, e);
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(io_err)?;
    file.write_all(launcher).map_err(io_err)?;
    file.write_all(archive).map_err(io_err)?;
    file.flush().map_err(io_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(fs::Permissions::from_mode(0o755))
            .map_err(io_err)?;
    }

    file.persist(output).map_err(|e| io_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    const LAUNCHER: &[u8] = b"MZ\x90\x00fake launcher image";
    const SHEBANG: &[u8] = b"#!/usr/bin/env python3\n";

    /// A zip application the way zipapp and shiv write it: the shebang and the
    /// archive share one stream, so zip offsets count the shebang.
    fn zipapp<F>(fill: F) -> Vec<u8>
    where
        F: FnOnce(&mut ZipWriter<Cursor<Vec<u8>>>),
    {
        let mut cursor = Cursor::new(SHEBANG.to_vec());
        cursor.set_position(SHEBANG.len() as u64);

        let mut zip = ZipWriter::new(cursor);
        fill(&mut zip);
        zip.finish().unwrap().into_inner()
    }

    fn pyz() -> Vec<u8> {
        zipapp(|zip| {
            let options =
                FileOptions::<()>::default().compression_method(zip::CompressionMethod::Deflated);
            zip.start_file("__main__.py", options).unwrap();
            zip.write_all(b"import app\napp.main()\n").unwrap();
            zip.start_file("app.py", options).unwrap();
            zip.write_all(b"def main():\n    print('hello')\n").unwrap();
        })
    }

    fn setup_with(archive: &[u8]) -> (TempDir, BundleConfig) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("stub.exe"), LAUNCHER).unwrap();
        fs::write(dir.path().join("app.pyz"), archive).unwrap();
        let config = BundleConfig::new(
            dir.path().join("stub.exe"),
            dir.path().join("app.pyz"),
            dir.path().join("app.exe"),
        );
        (dir, config)
    }

    fn setup() -> (TempDir, BundleConfig) {
        setup_with(&pyz())
    }

    #[test]
    fn test_bundle_concatenates() {
        let (_dir, config) = setup();
        let report = bundle(&config).unwrap();

        let written = fs::read(&config.output).unwrap();
        let mut expected = LAUNCHER.to_vec();
        expected.extend(pyz());
        assert_eq!(written, expected);

        assert_eq!(report.launcher_len, LAUNCHER.len() as u64);
        assert_eq!(report.archive_len, pyz().len() as u64);
        assert_eq!(report.total_len, written.len() as u64);
    }

    #[cfg(unix)]
    #[test]
    fn test_bundle_is_executable() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, config) = setup();
        bundle(&config).unwrap();
        let mode = fs::metadata(&config.output).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[test]
    fn test_bundle_rejects_non_archive() {
        let (dir, mut config) = setup();
        let script = dir.path().join("main.py");
        fs::write(&script, b"print('hello')\n").unwrap();
        config.archive = script;

        let err = bundle(&config).unwrap_err();
        assert!(matches!(err, BundleError::NotAnArchive { .. }));
        assert!(!config.output.exists());
    }

    #[test]
    fn test_bundle_rejects_non_archive_before_output_checks() {
        let (dir, mut config) = setup();
        let script = dir.path().join("main.py");
        fs::write(&script, b"print('hello')\n").unwrap();
        config.archive = script;
        fs::write(&config.output, b"old").unwrap();

        let err = bundle(&config).unwrap_err();
        assert!(matches!(err, BundleError::NotAnArchive { .. }));
        assert_eq!(fs::read(&config.output).unwrap(), b"old");
    }

    #[test]
    fn test_bundle_refuses_existing_output() {
        let (_dir, config) = setup();
        fs::write(&config.output, b"old").unwrap();

        let err = bundle(&config).unwrap_err();
        assert!(matches!(err, BundleError::OutputExists { .. }));
        assert_eq!(fs::read(&config.output).unwrap(), b"old");

        bundle(&config.clone().force(true)).unwrap();
        assert_ne!(fs::read(&config.output).unwrap(), b"old");
    }

    #[test]
    fn test_bundle_refuses_input_as_output() {
        let (_dir, mut config) = setup();
        config.output = config.launcher.clone();
        config.force = true;

        let err = bundle(&config).unwrap_err();
        assert!(matches!(err, BundleError::SameFile { .. }));
        assert_eq!(fs::read(&config.launcher).unwrap(), LAUNCHER);
    }

    #[test]
    fn test_bundle_missing_launcher() {
        let (dir, mut config) = setup();
        config.launcher = dir.path().join("missing.exe");

        let err = bundle(&config).unwrap_err();
        assert!(matches!(err, BundleError::Io { .. }));
        assert!(err.to_string().contains("missing.exe"));
    }

    #[test]
    fn test_failed_bundle_keeps_existing_output() {
        let (dir, mut config) = setup();
        fs::write(&config.output, b"old").unwrap();
        config.launcher = dir.path().join("missing.exe");
        config.force = true;

        assert!(bundle(&config).is_err());
        assert_eq!(fs::read(&config.output).unwrap(), b"old");
        // No temporary files left next to the output
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 3);
    }

    #[test]
    fn test_inspect_finds_payload() {
        let (_dir, config) = setup();
        bundle(&config).unwrap();

        let report = inspect(&config.output).unwrap();
        assert_eq!(report.entries, 2);
        assert_eq!(report.file_len, (LAUNCHER.len() + pyz().len()) as u64);
        // The shebang belongs to the archive, so the payload starts right
        // after the launcher
        assert_eq!(report.payload_offset, LAUNCHER.len() as u64);
        assert_eq!(report.archive_len, pyz().len() as u64);
    }

    #[test]
    fn test_inspect_plain_archive() {
        let (_dir, config) = setup();
        let report = inspect(&config.archive).unwrap();
        assert_eq!(report.payload_offset, 0);
        assert_eq!(report.entries, 2);
    }

    #[test]
    fn test_inspect_zip64_archive() {
        // More entries than the classic end record can count
        let archive = zipapp(|zip| {
            let options =
                FileOptions::<()>::default().compression_method(zip::CompressionMethod::Stored);
            for i in 0..65_536u32 {
                zip.start_file(format!("pkg/m{}.py", i), options).unwrap();
            }
        });
        let (_dir, config) = setup_with(&archive);
        bundle(&config).unwrap();

        let report = inspect(&config.output).unwrap();
        assert_eq!(report.entries, 65_536);
        assert_eq!(report.payload_offset, LAUNCHER.len() as u64);
    }

    #[test]
    fn test_inspect_large_file_entry() {
        let archive = zipapp(|zip| {
            let options = FileOptions::<()>::default()
                .compression_method(zip::CompressionMethod::Stored)
                .large_file(true);
            zip.start_file("__main__.py", options).unwrap();
            zip.write_all(b"print('zip64')\n").unwrap();
        });
        let (_dir, config) = setup_with(&archive);
        bundle(&config).unwrap();

        let report = inspect(&config.output).unwrap();
        assert_eq!(report.entries, 1);
        assert_eq!(report.payload_offset, LAUNCHER.len() as u64);
    }

    #[test]
    fn test_inspect_archive_with_comment() {
        let archive = zipapp(|zip| {
            zip.set_comment("built by pyzstub tests");
            zip.start_file("__main__.py", FileOptions::<()>::default())
                .unwrap();
            zip.write_all(b"pass\n").unwrap();
        });
        let (_dir, config) = setup_with(&archive);
        bundle(&config).unwrap();

        let report = inspect(&config.output).unwrap();
        assert_eq!(report.payload_offset, LAUNCHER.len() as u64);
        assert_eq!(report.archive_len, archive.len() as u64);
    }

    #[test]
    fn test_inspect_plain_executable() {
        let (_dir, config) = setup();
        let err = inspect(&config.launcher).unwrap_err();
        assert!(matches!(err, BundleError::NoPayload { .. }));
    }

    #[test]
    fn test_report_serializes() {
        let (_dir, config) = setup();
        let report = bundle(&config).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["launcher_len"], LAUNCHER.len() as u64);
        assert!(json["output"].as_str().unwrap().ends_with("app.exe"));
    }
}
