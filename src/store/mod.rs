//! Durable set of notice URLs that have already been reported.
//!
//! The whole set is loaded once and rewritten after every insertion. Entries
//! are never removed.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument};

/// First byte of every store file.
const STORE_VERSION: u8 = 1;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("store file {} is corrupt: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("store file {} has version {found}, expected {expected}", .path.display())]
    Version {
        path: PathBuf,
        found: u8,
        expected: u8,
    },
}

#[derive(Debug, Default, bitcode::Encode, bitcode::Decode)]
struct StoreFile {
    edikte: BTreeMap<String, bool>,
}

/// Set of notice URLs with "already reported" semantics.
#[derive(Debug)]
pub struct DedupStore {
    path: PathBuf,
    known: StoreFile,
}

impl DedupStore {
    /// Load the store from `path`. A missing file is an empty store.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let known = match fs::read(&path) {
            Ok(bytes) => decode(&path, &bytes)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("no store file yet, starting empty");
                StoreFile::default()
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        debug!(entries = known.edikte.len(), "store loaded");
        Ok(Self { path, known })
    }

    /// Record `url` as known and report whether it already was.
    ///
    /// A new URL is persisted before this returns. A known URL leaves the store
    /// and its file untouched. If persisting fails the URL is not kept in
    /// memory either, so the caller never sees it as known without it being on
    /// disk.
    pub fn test_and_insert(&mut self, url: &str) -> Result<bool, StoreError> {
        if self.known.edikte.contains_key(url) {
            return Ok(true);
        }

        self.known.edikte.insert(url.to_string(), true);
        if let Err(e) = self.persist() {
            self.known.edikte.remove(url);
            return Err(e);
        }

        debug!(url, entries = self.known.edikte.len(), "notice recorded");
        Ok(false)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.known.edikte.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.known.edikte.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.edikte.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the file: a sibling temp file is written, synced and renamed
    /// over the target.
    fn persist(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let mut payload = Vec::with_capacity(1 + self.known.edikte.len() * 96);
        payload.push(STORE_VERSION);
        payload.extend_from_slice(&bitcode::encode(&self.known));

        let tmp_path = tmp_path(&self.path);
        let mut file = fs::File::create(&tmp_path).map_err(io_err)?;
        file.write_all(&payload).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        drop(file);

        fs::rename(&tmp_path, &self.path).map_err(io_err)
    }
}

/// Sibling of `path` with ".tmp" appended to the whole file name, so it never
/// names the store itself.
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn decode(path: &Path, bytes: &[u8]) -> Result<StoreFile, StoreError> {
    let Some((&version, payload)) = bytes.split_first() else {
        return Err(StoreError::Corrupt {
            path: path.to_path_buf(),
            reason: "empty file".into(),
        });
    };

    if version != STORE_VERSION {
        return Err(StoreError::Version {
            path: path.to_path_buf(),
            found: version,
            expected: STORE_VERSION,
        });
    }

    bitcode::decode(payload).map_err(|e| StoreError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
