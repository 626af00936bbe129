//! ZIP archive access and Shift_JIS decoding for Aozora Bunko cards.
//!
//! Each card directory ships its text as `files/<id>_ruby_<n>.zip`, holding
//! one (rarely several) Shift_JIS encoded `.txt` entries and sometimes
//! images.

use crate::error::{Error, Result};
use encoding_rs::SHIFT_JIS;
use log::debug;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Extension of text entries inside an archive.
pub const TEXT_EXTENSION: &str = ".txt";

/// ZIP archive wrapper exposing the text entries.
pub struct AozoraArchive<R> {
    archive: ZipArchive<R>,
    path: Option<PathBuf>,
}

impl AozoraArchive<BufReader<File>> {
    /// Opens an archive from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut archive = Self::from_reader(BufReader::new(file))?;
        archive.path = Some(path.to_path_buf());
        Ok(archive)
    }
}

impl AozoraArchive<Cursor<Vec<u8>>> {
    /// Opens an archive from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_reader(Cursor::new(data))
    }
}

impl<R: Read + Seek> AozoraArchive<R> {
    /// Opens an archive from a reader.
    pub fn from_reader(reader: R) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;
        Ok(Self {
            archive,
            path: None,
        })
    }

    /// Path the archive was opened from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of entries of any kind.
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Returns true if the archive has no entries.
    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }

    /// Lists entry names ending in `.txt`, in archive order.
    pub fn text_entries(&self) -> Vec<String> {
        self.entries_with_extension(TEXT_EXTENSION)
    }

    /// Lists entry names ending in `extension`, in archive order.
    pub fn entries_with_extension(&self, extension: &str) -> Vec<String> {
        self.archive
            .file_names()
            .filter(|name| name.ends_with(extension))
            .map(String::from)
            .collect()
    }

    /// Reads an entry's raw bytes.
    pub fn read_binary(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut file = self
            .archive
            .by_name(name)
            .map_err(|e| Error::Archive(format!("{}: {}", name, e)))?;

        let mut data = Vec::new();
        file.read_to_end(&mut data)
            .map_err(|e| Error::Archive(format!("{}: {}", name, e)))?;
        Ok(data)
    }

    /// Reads an entry and decodes it as Shift_JIS.
    pub fn read_text(&mut self, name: &str) -> Result<String> {
        let data = self.read_binary(name)?;
        Ok(decode_shift_jis(&data))
    }
}

/// Decodes Shift_JIS bytes, dropping sequences that cannot be decoded.
pub fn decode_shift_jis(data: &[u8]) -> String {
    let (decoded, had_errors) = SHIFT_JIS.decode_without_bom_handling(data);
    if had_errors {
        debug!("dropping undecodable Shift_JIS sequences");
        decoded.chars().filter(|&c| c != '\u{FFFD}').collect()
    } else {
        decoded.into_owned()
    }
}

/// Finds every `*.zip` below `src`, recursively, sorted by path.
pub fn find_archives(src: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let src = src.as_ref();
    if !src.is_dir() {
        return Err(Error::SourceNotFound(src.to_path_buf()));
    }

    let escaped = src
        .to_str()
        .map(glob::Pattern::escape)
        .ok_or_else(|| Error::Glob(format!("non UTF-8 path: {}", src.display())))?;
    let pattern = Path::new(&escaped).join("**").join("*.zip");

    let mut paths = glob::glob(&pattern.to_string_lossy())?.collect::<std::result::Result<Vec<_>, _>>()?;
    paths.sort();
    Ok(paths)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Builds an in-memory archive; text entries are encoded as Shift_JIS.
    pub(crate) fn build_archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut buffer = Vec::new();
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = SimpleFileOptions::default();

        for (name, content) in entries {
            zip.start_file(*name, options).unwrap();
            let (encoded, _, _) = SHIFT_JIS.encode(content);
            zip.write_all(&encoded).unwrap();
        }

        zip.finish().unwrap();
        buffer
    }

    #[test]
    fn test_decode_shift_jis() {
        // "青空" in Shift_JIS
        let data = [0x90, 0xC2, 0x8B, 0xF3];
        assert_eq!(decode_shift_jis(&data), "青空");
    }

    #[test]
    fn test_decode_ascii() {
        assert_eq!(decode_shift_jis(b"Hello World"), "Hello World");
    }

    #[test]
    fn test_decode_drops_invalid_sequences() {
        // Lone lead byte 0x81 followed by a byte that is not a valid trail byte
        let data = [0x90, 0xC2, 0x81, 0x20, 0x8B, 0xF3];
        let decoded = decode_shift_jis(&data);
        assert!(!decoded.contains('\u{FFFD}'));
        assert!(decoded.starts_with('青'));
        assert!(decoded.ends_with('空'));
    }

    #[test]
    fn test_text_entries() {
        let data = build_archive(&[
            ("card/wagahai.txt", "吾輩は猫である\n"),
            ("card/fig01.png", "not an image"),
            ("card/notes.txt", "メモ\n"),
        ]);
        let archive = AozoraArchive::from_bytes(data).unwrap();
        assert_eq!(archive.len(), 3);
        assert_eq!(
            archive.text_entries(),
            vec!["card/wagahai.txt".to_string(), "card/notes.txt".to_string()]
        );
    }

    #[test]
    fn test_read_text_roundtrip() {
        let data = build_archive(&[("a.txt", "吾輩は猫である。\r\n名前はまだ無い。")]);
        let mut archive = AozoraArchive::from_bytes(data).unwrap();
        assert_eq!(
            archive.read_text("a.txt").unwrap(),
            "吾輩は猫である。\r\n名前はまだ無い。"
        );
    }

    #[test]
    fn test_missing_entry() {
        let data = build_archive(&[("a.txt", "x")]);
        let mut archive = AozoraArchive::from_bytes(data).unwrap();
        assert!(matches!(archive.read_text("b.txt"), Err(Error::Archive(_))));
    }

    #[test]
    fn test_corrupt_archive() {
        let result = AozoraArchive::from_bytes(b"PK\x03\x04 definitely not a zip".to_vec());
        assert!(matches!(result, Err(Error::Archive(_))));
    }

    #[test]
    fn test_find_archives() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("000001").join("files");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join("b.zip"), build_archive(&[])).unwrap();
        std::fs::write(dir.path().join("a.zip"), build_archive(&[])).unwrap();
        std::fs::write(dir.path().join("readme.txt"), "x").unwrap();

        let found = find_archives(dir.path()).unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.extension().unwrap() == "zip"));
        assert!(found.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_find_archives_with_pattern_characters_in_source() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("[cards]");
        std::fs::create_dir_all(src.join("000001")).unwrap();
        std::fs::write(src.join("000001").join("a.zip"), build_archive(&[])).unwrap();
        // Would match the unescaped class `[cards]`
        std::fs::create_dir_all(dir.path().join("c")).unwrap();
        std::fs::write(dir.path().join("c").join("b.zip"), build_archive(&[])).unwrap();

        let found = find_archives(&src).unwrap();
        assert_eq!(found, vec![src.join("000001").join("a.zip")]);
    }

    #[test]
    fn test_find_archives_missing_source() {
        let result = find_archives("/definitely/not/here");
        assert!(matches!(result, Err(Error::SourceNotFound(_))));
    }
}
