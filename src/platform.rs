//! Platform collaborators
//!
//! The editor never touches the filesystem, image codecs or a drawing surface
//! directly. It goes through these traits so that tests can substitute
//! in-memory doubles.

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use image::{DynamicImage, RgbaImage};

use crate::error::{DecodeError, ExportError};
use crate::render::Color;

/// Durable key-value slot for the editor snapshot.
pub trait StateStorage {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// One JSON file per key inside a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StateStorage for JsonFileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {:?}", path))?;
        Ok(Some(contents))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {:?}", self.dir))?;
        let path = self.path_for(key);
        // Replaced via rename; readers never see a partial file.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).with_context(|| format!("Failed to write {:?}", tmp))?;
        std::fs::rename(&tmp, &path).with_context(|| format!("Failed to replace {:?}", path))?;
        Ok(())
    }
}

/// Process-local storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl StateStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| anyhow::anyhow!("storage poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| anyhow::anyhow!("storage poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Receives finished export files.
pub trait FileSink: Send + Sync {
    /// Deliver `bytes` under `filename`; returns where it ended up.
    fn deliver(&self, filename: &str, mime: &str, bytes: &[u8]) -> std::io::Result<PathBuf>;
}

/// Writes exports into a directory, replacing files of the same name.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FileSink for DirectorySink {
    /// Written to a temp file beside the target and renamed into place, so
    /// a failed write never leaves a truncated export under `filename`.
    fn deliver(&self, filename: &str, _mime: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        let mut part = tempfile::Builder::new()
            .prefix(".facecard-")
            .suffix(".part")
            .tempfile_in(&self.dir)?;
        part.write_all(bytes)?;
        part.as_file().sync_all()?;
        part.persist(&path).map_err(|e| e.error)?;
        Ok(path)
    }
}

/// A file handed to a [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredFile {
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Keeps delivered files in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<Vec<DeliveredFile>>,
}

impl MemorySink {
    pub fn deliveries(&self) -> Vec<DeliveredFile> {
        self.files.lock().map(|f| f.clone()).unwrap_or_default()
    }
}

impl FileSink for MemorySink {
    fn deliver(&self, filename: &str, mime: &str, bytes: &[u8]) -> std::io::Result<PathBuf> {
        let mut files = self
            .files
            .lock()
            .map_err(|_| std::io::Error::other("sink poisoned"))?;
        files.push(DeliveredFile {
            filename: filename.to_string(),
            mime: mime.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(PathBuf::from(filename))
    }
}

/// Turns an image reference from a card into a bitmap.
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, source: &str) -> Result<DynamicImage, DecodeError>;
}

/// Decodes `data:` URLs and local files with the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceDecoder;

impl ImageDecoder for SourceDecoder {
    fn decode(&self, source: &str) -> Result<DynamicImage, DecodeError> {
        crate::image_loader::load_source(source)
    }
}

/// Caption text drawn onto a canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: Color,
    pub bold: bool,
}

/// A 2D drawing surface.
pub trait RasterCanvas: Send {
    fn size(&self) -> (u32, u32);

    /// Draw `image` with its top-left corner at `(x, y)`, unscaled.
    fn draw_image(&mut self, image: &RgbaImage, x: i64, y: i64);

    /// Draw `text` horizontally centered on `center_x`, sitting on `baseline`.
    fn fill_text_centered(
        &mut self,
        text: &str,
        center_x: f32,
        baseline: f32,
        style: &TextStyle,
    ) -> Result<(), ExportError>;

    fn encode_png(&self) -> Result<Vec<u8>, ExportError>;
}

/// Allocates drawing surfaces.
pub trait CanvasProvider: Send + Sync {
    fn create_canvas(&self, width: u32, height: u32) -> Result<Box<dyn RasterCanvas>, ExportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("nested"));
        assert_eq!(storage.read("k").unwrap(), None);
        storage.write("k", "{\"a\":1}").unwrap();
        assert_eq!(storage.read("k").unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(storage.path_for("k").ends_with("k.json"));
    }

    #[test]
    fn test_directory_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let path = sink.deliver("facecard.svg", "image/svg+xml", b"<svg/>").unwrap();
        assert_eq!(std::fs::read(path).unwrap(), b"<svg/>");
    }

    #[test]
    fn test_directory_sink_leaves_only_the_export() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        sink.deliver("facecard.png", "image/png", &[1; 64]).unwrap();
        sink.deliver("facecard.png", "image/png", &[2; 32]).unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("facecard.png")]);
        assert_eq!(std::fs::read(dir.path().join("facecard.png")).unwrap(), vec![2; 32]);
    }

    #[test]
    fn test_concurrent_deliveries_never_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let sink = std::sync::Arc::new(DirectorySink::new(dir.path()));
        let writers: Vec<_> = (0..4u8)
            .map(|n| {
                let sink = std::sync::Arc::clone(&sink);
                std::thread::spawn(move || {
                    sink.deliver("facecard-comparison.png", "image/png", &vec![n; 256 * 1024])
                        .unwrap();
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let bytes = std::fs::read(dir.path().join("facecard-comparison.png")).unwrap();
        assert_eq!(bytes.len(), 256 * 1024);
        assert!(bytes.iter().all(|b| *b == bytes[0]));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_memory_sink_records() {
        let sink = MemorySink::default();
        sink.deliver("a.png", "image/png", &[1, 2]).unwrap();
        let files = sink.deliveries();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].filename, "a.png");
    }
}
