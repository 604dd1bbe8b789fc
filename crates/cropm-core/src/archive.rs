//! Zip snapshots of packages and base64 data URIs for transport.
//!
//! A snapshot is anchored one level above the package directory, so the
//! package directory name is the top-level entry of the archive and
//! extracting it into the package root recreates the package.

use std::fs::{self, File};
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::CoreError;

/// Marker separating the media type from the payload in a data URI.
const BASE64_MARKER: &str = "base64,";

pub const ZIP_MEDIA_TYPE: &str = "application/zip";
pub const SVG_MEDIA_TYPE: &str = "image/svg+xml";

fn archive_err(err: impl std::fmt::Display) -> CoreError {
    CoreError::Archive {
        reason: err.to_string(),
    }
}

/// Builds an in-memory zip of every file under `dir`.
///
/// Entry names are relative to the parent of `dir` and use `/` separators.
pub fn zip_package(dir: &Path) -> Result<Vec<u8>, CoreError> {
    let anchor = dir.parent().unwrap_or_else(|| Path::new(""));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(archive_err)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(anchor).map_err(archive_err)?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        writer.start_file(name, options).map_err(archive_err)?;
        let bytes = fs::read(entry.path())?;
        writer.write_all(&bytes)?;
    }

    let cursor = writer.finish().map_err(archive_err)?;
    Ok(cursor.into_inner())
}

/// Extracts a zip held in memory into `dest`, creating it if needed.
///
/// Returns the extracted file paths relative to `dest`. Bytes that are not a
/// zip archive give [`CoreError::NotZip`]. Every entry path is checked before
/// anything is written, so an entry that would land outside `dest` aborts
/// with [`CoreError::Extraction`] and leaves `dest` untouched.
pub fn extract_archive(bytes: &[u8], dest: &Path) -> Result<Vec<PathBuf>, CoreError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| match e {
        ZipError::InvalidArchive(_) | ZipError::UnsupportedArchive(_) => CoreError::NotZip {
            reason: e.to_string(),
        },
        other => CoreError::Extraction {
            reason: other.to_string(),
        },
    })?;

    let mut plan = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i).map_err(|e| CoreError::Extraction {
            reason: e.to_string(),
        })?;
        let Some(relative) = entry.enclosed_name().map(|p| p.to_path_buf()) else {
            warn!(entry = entry.name(), "rejecting zip entry outside the destination");
            return Err(CoreError::Extraction {
                reason: format!("unsafe entry path: {}", entry.name()),
            });
        };
        plan.push((i, relative, entry.is_dir()));
    }

    fs::create_dir_all(dest)?;
    let mut extracted = Vec::new();

    for (i, relative, is_dir) in plan {
        let out_path = dest.join(&relative);
        if is_dir {
            fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut entry = archive.by_index(i).map_err(|e| CoreError::Extraction {
            reason: e.to_string(),
        })?;
        io::copy(&mut entry, &mut File::create(&out_path)?)?;
        extracted.push(relative);
    }

    debug!(files = extracted.len(), dest = %dest.display(), "extracted archive");
    Ok(extracted)
}

/// File entry names of a zip held in memory, in archive order.
pub fn archive_entries(bytes: &[u8]) -> Result<Vec<String>, CoreError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(|e| CoreError::NotZip {
        reason: e.to_string(),
    })?;
    let mut names = Vec::new();
    for i in 0..archive.len() {
        let entry = archive.by_index_raw(i).map_err(archive_err)?;
        if !entry.is_dir() {
            names.push(entry.name().to_string());
        }
    }
    Ok(names)
}

/// `data:<media_type>;base64,<payload>`.
pub fn encode_data_uri(media_type: &str, bytes: &[u8]) -> String {
    format!("data:{media_type};{BASE64_MARKER}{}", STANDARD.encode(bytes))
}

/// Decodes the payload following the first `base64,` marker.
///
/// ASCII whitespace inside the payload is ignored, so line-wrapped base64
/// decodes too.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, CoreError> {
    let (_, payload) = uri
        .split_once(BASE64_MARKER)
        .ok_or(CoreError::InvalidDataUri)?;
    let compact: Vec<u8> = payload
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    Ok(STANDARD.decode(compact)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_package(root: &Path) -> PathBuf {
        let pkg = root.join("wheat");
        fs::create_dir_all(pkg.join("crop2ml")).unwrap();
        fs::create_dir_all(pkg.join("src").join("py")).unwrap();
        fs::write(pkg.join("crop2ml").join("unit.Phenology.xml"), "<Model/>").unwrap();
        fs::write(pkg.join("src").join("py").join("phenology.py"), "pass\n").unwrap();
        fs::write(pkg.join("README.md"), "# wheat").unwrap();
        pkg
    }

    #[test]
    fn snapshot_is_anchored_at_package_name() {
        let root = tempfile::tempdir().unwrap();
        let pkg = sample_package(root.path());

        let bytes = zip_package(&pkg).unwrap();
        let mut names = archive_entries(&bytes).unwrap();
        names.sort();
        assert_eq!(
            names,
            vec![
                "wheat/README.md",
                "wheat/crop2ml/unit.Phenology.xml",
                "wheat/src/py/phenology.py"
            ]
        );
    }

    #[test]
    fn extract_recreates_package() {
        let src = tempfile::tempdir().unwrap();
        let pkg = sample_package(src.path());
        let bytes = zip_package(&pkg).unwrap();

        let dest = tempfile::tempdir().unwrap();
        let extracted = extract_archive(&bytes, dest.path()).unwrap();
        assert_eq!(extracted.len(), 3);
        let xml = fs::read_to_string(dest.path().join("wheat/crop2ml/unit.Phenology.xml")).unwrap();
        assert_eq!(xml, "<Model/>");
    }

    #[test]
    fn non_zip_bytes_are_reported() {
        let dest = tempfile::tempdir().unwrap();
        let err = extract_archive(b"definitely not a zip", dest.path()).unwrap_err();
        assert!(matches!(err, CoreError::NotZip { .. }));
    }

    #[test]
    fn traversal_entries_are_rejected() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("../escape.txt", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"x").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let dest = tempfile::tempdir().unwrap();
        let err = extract_archive(&bytes, &dest.path().join("root")).unwrap_err();
        assert!(matches!(err, CoreError::Extraction { .. }));
        assert!(!dest.path().join("escape.txt").exists());
    }

    #[test]
    fn unsafe_entry_aborts_before_any_write() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("wheat/crop2ml/unit.A.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<Model/>").unwrap();
        writer
            .start_file("../escape.txt", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"x").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let dest = tempfile::tempdir().unwrap();
        let root = dest.path().join("root");
        let err = extract_archive(&bytes, &root).unwrap_err();
        assert!(matches!(err, CoreError::Extraction { .. }));
        assert!(!root.join("wheat").join("crop2ml").join("unit.A.xml").exists());
        assert!(!root.exists());
        assert!(!dest.path().join("escape.txt").exists());
    }

    #[test]
    fn data_uri_roundtrip() {
        let uri = encode_data_uri(ZIP_MEDIA_TYPE, b"PK\x03\x04");
        assert!(uri.starts_with("data:application/zip;base64,"));
        assert_eq!(decode_data_uri(&uri).unwrap(), b"PK\x03\x04");
    }

    #[test]
    fn line_wrapped_payload_decodes() {
        let uri = "data:application/zip;base64,UEsD\r\nBA==\n";
        assert_eq!(decode_data_uri(uri).unwrap(), b"PK\x03\x04");
    }

    #[test]
    fn data_uri_errors_are_distinct() {
        assert!(matches!(
            decode_data_uri("no marker here"),
            Err(CoreError::InvalidDataUri)
        ));
        assert!(matches!(
            decode_data_uri("data:application/zip;base64,***"),
            Err(CoreError::Base64(_))
        ));
    }
}
