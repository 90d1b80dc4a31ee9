//! In-memory package contents
//!
//! A `.docx` file is a ZIP archive of parts addressed by path. [`FileMap`]
//! holds those parts as raw bytes while a document is being built. It is a
//! shared handle: clones refer to the same storage, so the numbering manager
//! and the archive writer observe each other's stores.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use std::sync::Arc;

use dashmap::DashMap;
use zip::read::ZipArchive;

use crate::error::Result;

/// Concurrent mapping from archive-internal paths to part contents
#[derive(Debug, Clone, Default)]
pub struct FileMap {
    files: Arc<DashMap<String, Vec<u8>>>,
}

impl FileMap {
    /// Create an empty file map
    pub fn new() -> Self {
        Self::default()
    }

    /// Open and unpack a DOCX/DOTX file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Unpack any ZIP reader into a new file map
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let map = Self::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().replace('\\', "/");

            // Skip directories
            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            map.store(name, contents);
        }

        log::debug!("unpacked {} parts", map.len());
        Ok(map)
    }

    /// Get a copy of a part's contents
    pub fn load(&self, path: &str) -> Option<Vec<u8>> {
        self.files.get(path).map(|entry| entry.value().clone())
    }

    /// Get a part's contents as a string
    pub fn load_string(&self, path: &str) -> Option<String> {
        self.files
            .get(path)
            .map(|entry| String::from_utf8_lossy(entry.value()).into_owned())
    }

    /// Set or replace a part's contents
    pub fn store(&self, path: impl Into<String>, contents: Vec<u8>) {
        self.files.insert(path.into(), contents);
    }

    /// Set a part's contents from a string
    pub fn store_string(&self, path: impl Into<String>, contents: impl Into<String>) {
        self.store(path, contents.into().into_bytes());
    }

    /// Remove a part
    pub fn remove(&self, path: &str) -> Option<Vec<u8>> {
        self.files.remove(path).map(|(_, contents)| contents)
    }

    /// Check if a part exists
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Number of parts
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the map holds no parts
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// All part paths in sorted order
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.files.iter().map(|e| e.key().clone()).collect();
        paths.sort();
        paths
    }

    /// Sorted copy of every part
    pub fn snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        self.files
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }
}
