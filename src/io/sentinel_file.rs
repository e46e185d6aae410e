//! Sentinel-terminated store files
//!
//! A store file is a sequence of fixed-width lines followed by one sentinel
//! line (`END` + padding). This module owns the low-level byte layout and
//! the rewrite protocol; it knows nothing about record types beyond the
//! expected line width and the sentinel text.
//!
//! # Rewrite protocol
//!
//! Every mutation is a whole-file rewrite: the new lines plus the sentinel
//! are written to a freshly created temporary file in the same directory,
//! which then atomically replaces the original path via rename. The original
//! file is never written in place, so a failure at any point before the
//! rename leaves its prior contents intact. A crash between rewrites of two
//! different store files can still leave the files mutually inconsistent;
//! that is an accepted limitation of the format, not something this layer
//! hides.
//!
//! Every append is therefore an O(n) rewrite. Record counts are small and
//! keeping the layout simple is the point, so there is no incremental path.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// One sentinel-terminated fixed-width store file
///
/// Stateless between calls apart from the configured path and layout
/// constants; the authoritative state is always the file contents, and
/// `read_lines` re-reads from disk on every call.
#[derive(Debug)]
pub struct SentinelFile {
    path: PathBuf,
    width: usize,
    sentinel: String,
}

impl SentinelFile {
    /// Create a handle for a store file
    ///
    /// # Arguments
    ///
    /// * `path` - The store file path; it need not exist yet
    /// * `width` - Exact character width of every line, sentinel included
    /// * `sentinel` - The exact sentinel line text
    pub fn new(path: impl Into<PathBuf>, width: usize, sentinel: String) -> Self {
        SentinelFile {
            path: path.into(),
            width,
            sentinel,
        }
    }

    /// The store file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all raw data lines, stopping at (and excluding) the sentinel
    ///
    /// Re-reads from disk on every call. Lines of the wrong width are
    /// skipped with a diagnostic, not treated as fatal, so a legacy or
    /// hand-edited file still loads. A missing file reads as empty.
    pub fn read_lines(&self) -> io::Result<Vec<String>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut lines = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line == self.sentinel {
                break;
            }
            if line.len() != self.width {
                warn!(
                    path = %self.path.display(),
                    line = index + 1,
                    expected = self.width,
                    actual = line.len(),
                    "skipping line with wrong width"
                );
                continue;
            }
            lines.push(line);
        }
        Ok(lines)
    }

    /// Replace the file contents with the given lines plus the sentinel
    ///
    /// Writes everything to a sibling temporary file, flushes and syncs it,
    /// then renames it over the original path. Succeeds even when the
    /// original file does not exist yet. On any failure the original file is
    /// left untouched and the temporary file is removed on a best-effort
    /// basis.
    pub fn rewrite<I, S>(&self, lines: I) -> io::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tmp_path = self.tmp_path();

        let result = self.write_tmp(&tmp_path, lines);
        if let Err(e) = result {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        Ok(())
    }

    /// Append one line before the sentinel
    ///
    /// Equivalent to rewriting the current contents with the line added at
    /// the end.
    pub fn append(&self, line: &str) -> io::Result<()> {
        let mut lines = self.read_lines()?;
        lines.push(line.to_string());
        self.rewrite(lines)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_tmp<I, S>(&self, tmp_path: &Path, lines: I) -> io::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let file = File::create(tmp_path)?;
        let mut writer = BufWriter::new(file);
        for line in lines {
            writer.write_all(line.as_ref().as_bytes())?;
            writer.write_all(b"\n")?;
        }
        writer.write_all(self.sentinel.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }
}
