//! NDJSON export sink: one serialized record per line, promoted into place on finish.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const WRITE_BUF_BYTES: usize = 256 * 1024;

/// Buffered writer on `<final>.inprogress`; `finish()` flushes and renames onto the final path,
/// so a crashed run never leaves a half-written export under the real name.
pub struct NdjsonWriter {
    tmp: PathBuf,
    dest: PathBuf,
    w: BufWriter<File>,
    written: u64,
}

impl NdjsonWriter {
    pub fn create(dest: &Path) -> Result<Self> {
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
        }
        let mut tmp = dest.as_os_str().to_owned();
        tmp.push(".inprogress");
        let tmp = PathBuf::from(tmp);
        let f = File::create(&tmp).with_context(|| format!("create {}", tmp.display()))?;
        Ok(Self { tmp, dest: dest.to_path_buf(), w: BufWriter::with_capacity(WRITE_BUF_BYTES, f), written: 0 })
    }

    pub fn write_record<T: Serialize>(&mut self, rec: &T) -> Result<()> {
        serde_json::to_writer(&mut self.w, rec).with_context(|| format!("serialize into {}", self.tmp.display()))?;
        self.w.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Flush and move into place. Returns the number of records written.
    pub fn finish(mut self) -> Result<u64> {
        self.w.flush().with_context(|| format!("flush {}", self.tmp.display()))?;
        drop(self.w);
        if self.dest.exists() {
            fs::remove_file(&self.dest).with_context(|| format!("remove {}", self.dest.display()))?;
        }
        fs::rename(&self.tmp, &self.dest)
            .with_context(|| format!("rename {} -> {}", self.tmp.display(), self.dest.display()))?;
        Ok(self.written)
    }
}

/// Write every record of `records` to `dest` as NDJSON.
pub fn export_ndjson<'a, T, I>(dest: &Path, records: I) -> Result<u64>
where
    T: Serialize + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut w = NdjsonWriter::create(dest)?;
    for r in records {
        w.write_record(r)?;
    }
    let n = w.finish()?;
    tracing::info!(path = %dest.display(), records = n, "Export written");
    Ok(n)
}
