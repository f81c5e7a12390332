//! Single-entry extraction from release archives
//!
//! Pulls exactly one file out of a `.tar.gz` or `.zip` held in memory and
//! writes it flat into the destination directory, whatever directory prefix
//! the entry carried inside the archive.

use std::fs::{self, File};
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use log::{debug, info, warn};
use tar::Archive;
use zip::ZipArchive;

use super::asset::ArchiveKind;
use super::fetch::DownloadedArchive;
use crate::error::{InstallError, Stage};

const ARTIFACT_MISSING: &str = "artifact missing post-extraction";

/// Extract `target` from a downloaded archive into `dest_dir`.
///
/// Decoding is CPU-bound, so it runs on the blocking pool.
pub async fn extract_archive(
    archive: DownloadedArchive,
    target: &str,
    dest_dir: &Path,
) -> Result<PathBuf, InstallError> {
    let target = target.to_string();
    let dest_dir = dest_dir.to_path_buf();

    tokio::task::spawn_blocking(move || {
        extract_executable(
            &archive.bytes,
            archive.asset.archive_kind,
            &target,
            &dest_dir,
        )
    })
    .await
    .map_err(|e| InstallError::extraction(format!("extraction task failed: {e}")))?
}

/// Extract the entry whose base name equals `target` to `dest_dir/target`.
///
/// Success is defined by the destination file existing afterwards, not by the
/// decoder finishing without error.
pub fn extract_executable(
    bytes: &[u8],
    kind: ArchiveKind,
    target: &str,
    dest_dir: &Path,
) -> Result<PathBuf, InstallError> {
    let dest = dest_dir.join(target);
    remove_stale(&dest)?;

    info!("Extracting {target} from downloaded {kind} archive...");
    let found = match kind {
        ArchiveKind::TarGz => extract_from_tar_gz(bytes, target, &dest)?,
        ArchiveKind::Zip => extract_from_zip(bytes, target, &dest)?,
    };
    if !found {
        warn!("No entry named {target} in archive");
    }

    if !dest.is_file() {
        return Err(InstallError::extraction(ARTIFACT_MISSING));
    }

    info!("Successfully extracted binary to: {}", dest.display());
    Ok(dest)
}

/// Stream the tarball, skipping every entry but the first matching file
fn extract_from_tar_gz(bytes: &[u8], target: &str, dest: &Path) -> Result<bool, InstallError> {
    let mut archive = Archive::new(GzDecoder::new(bytes));
    let entries = archive.entries().map_err(corrupt_archive)?;

    for entry in entries {
        let mut entry = entry.map_err(corrupt_archive)?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let name = entry
            .path()
            .map_err(corrupt_archive)?
            .to_string_lossy()
            .into_owned();
        if entry_base_name(&name) != target {
            continue;
        }
        debug!("Matched tar entry {name}");

        write_entry(&mut entry, dest)?;
        return Ok(true);
    }

    Ok(false)
}

/// Random-access lookup of the first matching file in the zip
fn extract_from_zip(bytes: &[u8], target: &str, dest: &Path) -> Result<bool, InstallError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| InstallError::extraction(format!("failed to read ZIP archive: {e}")))?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(|e| {
            InstallError::extraction(format!("failed to read ZIP entry at index {i}: {e}"))
        })?;

        if file.is_dir() || entry_base_name(file.name()) != target {
            continue;
        }
        debug!("Matched zip entry {}", file.name());

        write_entry(&mut file, dest)?;
        return Ok(true);
    }

    debug!(
        "ZIP archive contains: {}",
        archive.file_names().collect::<Vec<_>>().join(", ")
    );
    Ok(false)
}

/// Last component of an archive entry name; zips built on Windows may use `\`
fn entry_base_name(name: &str) -> &str {
    name.trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name)
}

fn write_entry(reader: &mut impl Read, dest: &Path) -> Result<(), InstallError> {
    let mut out = File::create(dest).map_err(|e| InstallError::io(Stage::Extract, dest, e))?;
    if let Err(e) = io::copy(reader, &mut out) {
        // Never leave a truncated executable behind for the shim to run
        drop(out);
        let _ = fs::remove_file(dest);
        return Err(InstallError::extraction(format!(
            "failed to write {}: {e}",
            dest.display()
        )));
    }
    Ok(())
}

/// A previous install's file must not satisfy the post-extraction check
fn remove_stale(dest: &Path) -> Result<(), InstallError> {
    match fs::remove_file(dest) {
        Ok(()) => {
            debug!("Removed previous artifact at {}", dest.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(InstallError::io(Stage::Extract, dest, e)),
    }
}

fn corrupt_archive(e: io::Error) -> InstallError {
    InstallError::extraction(format!("failed to read tar.gz archive: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;

    fn tar_gz(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (path, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_entry_type(tar::EntryType::Regular);
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            builder.append_data(&mut header, path, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    fn zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_tar_gz_nested_entry_is_flattened() {
        let bytes = tar_gz(&[
            ("README.md", b"readme"),
            ("demo_1.2.3/LICENSE", b"license"),
            ("demo_1.2.3/bin/demo", b"\x7fELF binary"),
        ]);
        let dir = tempdir().unwrap();

        let path = extract_executable(&bytes, ArchiveKind::TarGz, "demo", dir.path()).unwrap();

        assert_eq!(path, dir.path().join("demo"));
        assert_eq!(fs::read(&path).unwrap(), b"\x7fELF binary");
        assert_eq!(dir_entries(dir.path()), vec!["demo"]);
    }

    #[test]
    fn test_zip_nested_entry_is_flattened() {
        let bytes = zip(&[
            ("demo_1.2.3/README.md", b"readme"),
            ("demo_1.2.3/demo.exe", b"MZ binary"),
        ]);
        let dir = tempdir().unwrap();

        let path = extract_executable(&bytes, ArchiveKind::Zip, "demo.exe", dir.path()).unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"MZ binary");
        assert_eq!(dir_entries(dir.path()), vec!["demo.exe"]);
    }

    #[test]
    fn test_tar_gz_root_entry() {
        let bytes = tar_gz(&[("demo", b"root binary")]);
        let dir = tempdir().unwrap();

        let path = extract_executable(&bytes, ArchiveKind::TarGz, "demo", dir.path()).unwrap();
        assert_eq!(fs::read(path).unwrap(), b"root binary");
    }

    #[test]
    fn test_similar_names_do_not_match() {
        let bytes = tar_gz(&[("bin/demo-helper", b"helper"), ("bin/xdemo", b"other")]);
        let dir = tempdir().unwrap();

        let err = extract_executable(&bytes, ArchiveKind::TarGz, "demo", dir.path()).unwrap_err();
        assert!(matches!(err, InstallError::ExtractionFailed { ref reason } if reason == ARTIFACT_MISSING));
        assert!(dir_entries(dir.path()).is_empty());
    }

    #[test]
    fn test_zip_missing_entry_fails() {
        let bytes = zip(&[("pull-watch.exe", b"MZ")]);
        let dir = tempdir().unwrap();

        let err = extract_executable(&bytes, ArchiveKind::Zip, "demo.exe", dir.path()).unwrap_err();
        assert!(matches!(err, InstallError::ExtractionFailed { ref reason } if reason == ARTIFACT_MISSING));
        assert!(!dir.path().join("demo.exe").exists());
    }

    #[test]
    fn test_zip_backslash_names() {
        let bytes = zip(&[("dist\\demo.exe", b"MZ windows")]);
        let dir = tempdir().unwrap();

        let path = extract_executable(&bytes, ArchiveKind::Zip, "demo.exe", dir.path()).unwrap();
        assert_eq!(fs::read(path).unwrap(), b"MZ windows");
    }

    #[test]
    fn test_existing_file_is_overwritten() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("demo"), b"old version").unwrap();

        let bytes = tar_gz(&[("demo", b"new version")]);
        extract_executable(&bytes, ArchiveKind::TarGz, "demo", dir.path()).unwrap();

        assert_eq!(fs::read(dir.path().join("demo")).unwrap(), b"new version");
        assert_eq!(dir_entries(dir.path()), vec!["demo"]);
    }

    #[test]
    fn test_stale_file_does_not_satisfy_check() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("demo"), b"from last install").unwrap();

        let bytes = tar_gz(&[("other", b"nope")]);
        let err = extract_executable(&bytes, ArchiveKind::TarGz, "demo", dir.path()).unwrap_err();

        assert!(matches!(err, InstallError::ExtractionFailed { .. }));
        assert!(!dir.path().join("demo").exists());
    }

    #[test]
    fn test_directory_named_like_target_is_skipped() {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let mut dir_header = tar::Header::new_gnu();
        dir_header.set_entry_type(tar::EntryType::Directory);
        dir_header.set_size(0);
        dir_header.set_mode(0o755);
        builder
            .append_data(&mut dir_header, "demo/", io::empty())
            .unwrap();
        let mut file_header = tar::Header::new_gnu();
        file_header.set_entry_type(tar::EntryType::Regular);
        file_header.set_size(4);
        file_header.set_mode(0o644);
        builder
            .append_data(&mut file_header, "demo/demo", &b"real"[..])
            .unwrap();
        let bytes = builder.into_inner().unwrap().finish().unwrap();

        let dir = tempdir().unwrap();
        let path = extract_executable(&bytes, ArchiveKind::TarGz, "demo", dir.path()).unwrap();
        assert!(path.is_file());
        assert_eq!(fs::read(path).unwrap(), b"real");
    }

    #[test]
    fn test_corrupt_tar_gz() {
        let dir = tempdir().unwrap();
        let err =
            extract_executable(b"definitely not gzip", ArchiveKind::TarGz, "demo", dir.path())
                .unwrap_err();
        assert!(matches!(err, InstallError::ExtractionFailed { .. }));
    }

    #[test]
    fn test_truncated_tar_gz_leaves_nothing() {
        // Incompressible, so cutting the gzip stream in half lands mid-entry
        let mut seed = 0x2545_F491_u32;
        let payload: Vec<u8> = (0..64 * 1024)
            .map(|_| {
                seed ^= seed << 13;
                seed ^= seed >> 17;
                seed ^= seed << 5;
                seed as u8
            })
            .collect();
        let mut bytes = tar_gz(&[("demo", &payload)]);
        bytes.truncate(bytes.len() / 2);
        let dir = tempdir().unwrap();

        let err = extract_executable(&bytes, ArchiveKind::TarGz, "demo", dir.path()).unwrap_err();
        assert!(matches!(err, InstallError::ExtractionFailed { .. }));
        assert!(!dir.path().join("demo").exists());
    }

    #[test]
    fn test_corrupt_zip() {
        let dir = tempdir().unwrap();
        let err = extract_executable(b"PK nope", ArchiveKind::Zip, "demo.exe", dir.path())
            .unwrap_err();
        match err {
            InstallError::ExtractionFailed { reason } => {
                assert!(reason.starts_with("failed to read ZIP archive"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_entry_base_name() {
        assert_eq!(entry_base_name("demo"), "demo");
        assert_eq!(entry_base_name("a/b/demo"), "demo");
        assert_eq!(entry_base_name("a\\b\\demo.exe"), "demo.exe");
        assert_eq!(entry_base_name("demo/"), "demo");
    }

    #[tokio::test]
    async fn test_extract_archive_on_blocking_pool() {
        use crate::install::asset::AssetDescriptor;

        let archive = DownloadedArchive {
            asset: AssetDescriptor {
                file_name: "demo_Linux_arm64.tar.gz".into(),
                archive_kind: ArchiveKind::TarGz,
            },
            bytes: tar_gz(&[("demo_Linux_arm64/demo", b"arm binary")]),
        };
        let dir = tempdir().unwrap();

        let path = extract_archive(archive, "demo", dir.path()).await.unwrap();
        assert_eq!(fs::read(path).unwrap(), b"arm binary");
    }
}
