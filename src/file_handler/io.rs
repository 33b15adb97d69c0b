//! Source reading and page writing
//!
//! Provides:
//! - Notebook source reading with UTF-8 / UTF-16 encoding detection
//! - A size limit on sources
//! - Atomic page writes so a viewer never sees a half-written page

use crate::error::{FileError, FileResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Source size that triggers a warning (1 MB)
pub const WARNING_FILE_SIZE: u64 = 1024 * 1024;

/// Detected encoding of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileEncoding {
    /// UTF-8 without BOM
    #[default]
    Utf8,
    /// UTF-8 with BOM
    Utf8Bom,
    /// UTF-16 Little Endian with BOM
    Utf16Le,
    /// UTF-16 Big Endian with BOM
    Utf16Be,
    /// Not valid UTF-8 (lossy conversion used)
    Unknown,
}

/// A notebook source read from disk
#[derive(Debug, Clone)]
pub struct SourceText {
    /// Decoded text
    pub content: String,
    /// Detected encoding
    pub encoding: FileEncoding,
    /// Size on disk in bytes
    pub size_bytes: u64,
    /// Whether lossy conversion was used
    pub lossy: bool,
}

/// Detect file encoding from raw bytes
fn detect_encoding(bytes: &[u8]) -> FileEncoding {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return FileEncoding::Utf8Bom;
    }
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return FileEncoding::Utf16Le;
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return FileEncoding::Utf16Be;
    }

    if std::str::from_utf8(bytes).is_ok() {
        FileEncoding::Utf8
    } else {
        FileEncoding::Unknown
    }
}

/// Decode bytes to string based on detected encoding
fn decode_content(bytes: &[u8], encoding: FileEncoding) -> (String, bool) {
    match encoding {
        FileEncoding::Utf8 => decode_utf8(bytes),
        FileEncoding::Utf8Bom => decode_utf8(&bytes[3..]),
        FileEncoding::Utf16Le => decode_utf16(&bytes[2..], u16::from_le_bytes),
        FileEncoding::Utf16Be => decode_utf16(&bytes[2..], u16::from_be_bytes),
        FileEncoding::Unknown => (String::from_utf8_lossy(bytes).into_owned(), true),
    }
}

fn decode_utf8(bytes: &[u8]) -> (String, bool) {
    match std::str::from_utf8(bytes) {
        Ok(s) => (s.to_string(), false),
        Err(_) => (String::from_utf8_lossy(bytes).into_owned(), true),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> (String, bool) {
    let mut lossy = false;
    let units = bytes.chunks_exact(2).map(|chunk| unit([chunk[0], chunk[1]]));

    let result: String = char::decode_utf16(units)
        .map(|r| {
            r.unwrap_or_else(|_| {
                lossy = true;
                '\u{FFFD}'
            })
        })
        .collect();

    (result, lossy)
}

fn decode_source(path: &Path, bytes: Vec<u8>, size_bytes: u64) -> SourceText {
    let encoding = detect_encoding(&bytes);
    let (content, lossy) = decode_content(&bytes, encoding);
    if lossy {
        log::warn!("{} is not valid {:?}; decoded lossily", path.display(), encoding);
    }
    if size_bytes > WARNING_FILE_SIZE {
        log::info!("Large notebook: {} ({} bytes)", path.display(), size_bytes);
    }
    SourceText {
        content,
        encoding,
        size_bytes,
        lossy,
    }
}

fn check_size(path: &Path, size_bytes: u64, max_size: u64) -> FileResult<()> {
    if size_bytes > max_size {
        return Err(FileError::FileTooLarge {
            path: path.to_path_buf(),
            size: size_bytes,
            max_size,
        });
    }
    Ok(())
}

/// Read a notebook source with encoding detection
pub async fn read_source(path: impl AsRef<Path>, max_size: u64) -> FileResult<SourceText> {
    let path = path.as_ref();

    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(FileError::SourceUnavailable {
            path: path.to_path_buf(),
        });
    }

    let metadata = tokio::fs::metadata(path).await.map_err(|e| FileError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    check_size(path, metadata.len(), max_size)?;

    let bytes = tokio::fs::read(path).await.map_err(|e| FileError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(decode_source(path, bytes, metadata.len()))
}

/// Temp file next to `path`, so the final rename stays on one filesystem
fn temp_path_for(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or(Path::new("."));
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "page".to_string());

    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    parent.join(format!(".{}.{}.tmp", filename, timestamp))
}

/// Write content to a file using atomic write
///
/// The file is either fully written or unchanged.
pub fn write_file_atomic_sync(path: impl AsRef<Path>, content: &str) -> FileResult<()> {
    let path = path.as_ref();
    let temp_path = temp_path_for(path);

    let write_result = (|| {
        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;
        file.sync_all()?;
        Ok::<(), std::io::Error>(())
    })();

    if let Err(e) = write_result {
        let _ = std::fs::remove_file(&temp_path);
        return Err(FileError::WriteError {
            path: path.to_path_buf(),
            source: e,
        });
    }

    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(FileError::RenameError {
            path: path.to_path_buf(),
            source: e,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_FILE_SIZE;
    use tempfile::TempDir;

    #[test]
    fn test_detect_encoding_utf8() {
        let bytes = "Hello, world!".as_bytes();
        assert_eq!(detect_encoding(bytes), FileEncoding::Utf8);
    }

    #[test]
    fn test_detect_encoding_utf8_bom() {
        let bytes = [0xEF, 0xBB, 0xBF, b'H', b'i'];
        assert_eq!(detect_encoding(&bytes), FileEncoding::Utf8Bom);
        assert_eq!(decode_content(&bytes, FileEncoding::Utf8Bom), ("Hi".to_string(), false));
    }

    #[test]
    fn test_decode_utf16() {
        let le = [0xFF, 0xFE, b'{', 0, b'}', 0];
        assert_eq!(detect_encoding(&le), FileEncoding::Utf16Le);
        assert_eq!(decode_content(&le, FileEncoding::Utf16Le).0, "{}");

        let be = [0xFE, 0xFF, 0, b'{', 0, b'}'];
        assert_eq!(detect_encoding(&be), FileEncoding::Utf16Be);
        assert_eq!(decode_content(&be, FileEncoding::Utf16Be).0, "{}");
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let bytes = [b'a', 0xFF, b'b'];
        assert_eq!(detect_encoding(&bytes), FileEncoding::Unknown);
        let (text, lossy) = decode_content(&bytes, FileEncoding::Unknown);
        assert!(lossy);
        assert!(text.starts_with('a') && text.ends_with('b'));
    }

    #[tokio::test]
    async fn test_read_source() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nb.ipynb");
        std::fs::write(&path, r#"{"cells":[]}"#).unwrap();

        let source = read_source(&path, MAX_FILE_SIZE).await.unwrap();
        assert_eq!(source.content, r#"{"cells":[]}"#);
        assert_eq!(source.encoding, FileEncoding::Utf8);
        assert!(!source.lossy);
    }

    #[tokio::test]
    async fn test_missing_source_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let err = read_source(dir.path().join("missing.ipynb"), MAX_FILE_SIZE)
            .await
            .unwrap_err();
        assert!(matches!(err, FileError::SourceUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_source_too_large() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.ipynb");
        std::fs::write(&path, "0123456789").unwrap();

        let err = read_source(&path, 4).await.unwrap_err();
        assert!(matches!(err, FileError::FileTooLarge { size: 10, max_size: 4, .. }));
    }

    #[test]
    fn test_write_file_atomic_sync() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page.html");

        write_file_atomic_sync(&path, "first").unwrap();
        write_file_atomic_sync(&path, "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let err = write_file_atomic_sync(dir.path().join("nope/page.html"), "x").unwrap_err();
        assert!(matches!(err, FileError::WriteError { .. }));
    }
}
