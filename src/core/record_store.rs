//! Generic CRUD over a sentinel-terminated store file
//!
//! `RecordStore<R>` is the typed façade the business layer talks to. It
//! composes the codec (pure encode/decode) with the sentinel file (byte
//! layout and rewrite protocol) and adds key-based lookup and removal.
//!
//! The store is deliberately thin on policy:
//!
//! - It never checks key uniqueness on append; callers check `exists` first.
//! - Lines that fail to decode are dropped with a diagnostic so legacy or
//!   malformed data never blocks loading.
//! - "Not found" on update/delete is a zero count, not an error.
//!
//! One store assumes exclusive single-writer access for the process
//! lifetime; there is no file locking.

use crate::io::{FixedWidthRecord, SentinelFile};
use crate::types::MarketError;
use std::marker::PhantomData;
use std::path::Path;
use tracing::warn;

/// Typed CRUD layer over one store file
#[derive(Debug)]
pub struct RecordStore<R: FixedWidthRecord> {
    file: SentinelFile,
    _record: PhantomData<R>,
}

impl<R: FixedWidthRecord> RecordStore<R> {
    /// Open a store for the record type's canonical layout
    ///
    /// The backing file need not exist yet; the first mutation creates it.
    pub fn open(path: impl Into<std::path::PathBuf>) -> Self {
        let file = SentinelFile::new(path, R::LAYOUT.total_width(), R::sentinel_line());
        RecordStore {
            file,
            _record: PhantomData,
        }
    }

    /// The backing file path
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Load every record in the file, in file order
    ///
    /// Lines that fail to decode are dropped with a diagnostic; loading
    /// continues. Only I/O failures are fatal to the call.
    pub fn load_all(&self) -> Result<Vec<R>, MarketError> {
        let lines = self
            .file
            .read_lines()
            .map_err(|e| MarketError::io(self.file.path(), &e))?;

        let mut records = Vec::with_capacity(lines.len());
        for line in &lines {
            match R::decode(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!(path = %self.file.path().display(), error = %e, "dropping undecodable line");
                }
            }
        }
        Ok(records)
    }

    /// Append a record at end-of-file, moving the sentinel after it
    ///
    /// No duplicate-key check is performed; uniqueness is the caller's
    /// responsibility.
    pub fn append(&self, record: &R) -> Result<(), MarketError> {
        self.file
            .append(&record.encode())
            .map_err(|e| MarketError::io(self.file.path(), &e))
    }

    /// Replace every record matching the key with `new`, in one rewrite
    ///
    /// Loads all records, filters out key matches, appends `new` to the
    /// filtered set, and rewrites the file in a single pass - there is no
    /// window where the record is absent on disk. The replacement lands at
    /// end of file; stores are unordered sets keyed by identity, so the
    /// position change is immaterial.
    ///
    /// Returns the number of records replaced; zero means the key was not
    /// present (the new record is still written).
    pub fn update_by_key(&self, key: &R::Key, new: R) -> Result<usize, MarketError> {
        let records = self.load_all()?;
        let before = records.len();
        let mut kept: Vec<R> = records.into_iter().filter(|r| r.key() != *key).collect();
        let replaced = before - kept.len();
        kept.push(new);

        self.rewrite_records(&kept)?;
        Ok(replaced)
    }

    /// Delete every record matching the key
    ///
    /// Returns the number of records removed; zero means "not found" and is
    /// never an error.
    pub fn delete_by_key(&self, key: &R::Key) -> Result<usize, MarketError> {
        self.delete_where(|record| record.key() == *key)
    }

    /// Delete every record matching a predicate
    ///
    /// Used for multi-record removal sharing a key component, e.g. all
    /// inventory listings by one seller. Returns the number removed.
    pub fn delete_where<F>(&self, matches: F) -> Result<usize, MarketError>
    where
        F: Fn(&R) -> bool,
    {
        let records = self.load_all()?;
        let before = records.len();
        let kept: Vec<R> = records.into_iter().filter(|r| !matches(r)).collect();
        let removed = before - kept.len();

        // Nothing matched: leave the file byte-for-byte unchanged.
        if removed == 0 {
            return Ok(0);
        }

        self.rewrite_records(&kept)?;
        Ok(removed)
    }

    /// Whether any record with the key exists
    pub fn exists(&self, key: &R::Key) -> Result<bool, MarketError> {
        Ok(self.load_all()?.iter().any(|r| r.key() == *key))
    }

    /// The first record with the key, if any
    pub fn find(&self, key: &R::Key) -> Result<Option<R>, MarketError> {
        Ok(self.load_all()?.into_iter().find(|r| r.key() == *key))
    }

    fn rewrite_records(&self, records: &[R]) -> Result<(), MarketError> {
        let lines: Vec<String> = records.iter().map(|r| r.encode()).collect();
        self.file
            .rewrite(lines)
            .map_err(|e| MarketError::io(self.file.path(), &e))
    }
}
