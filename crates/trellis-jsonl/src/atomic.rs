//! Atomic JSONL writes.
//!
//! Records are written to `<file>.tmp`, flushed, then renamed over the
//! target. A crash mid-write leaves the previous file untouched.

use crate::Result;
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

/// Atomically replaces `path` with one JSON line per value.
///
/// # Errors
///
/// Returns an error if a value fails to serialize, the temp file cannot be
/// written, or the final rename fails. On error the temp file is removed on a
/// best-effort basis and the original file is left as it was.
pub async fn write_jsonl_atomic<T, I, P>(path: P, values: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let temp_path = make_temp_path(path);

    if let Err(e) = write_to_temp_file(&temp_path, values).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e);
    }

    tokio::fs::rename(&temp_path, path).await?;
    tracing::debug!(path = %path.display(), "Wrote JSONL file");
    Ok(())
}

/// `data.jsonl` -> `data.jsonl.tmp`, `data` -> `data.tmp`.
fn make_temp_path(path: &Path) -> PathBuf {
    let extension = match path.extension() {
        Some(ext) => {
            let mut ext = ext.to_os_string();
            ext.push(".tmp");
            ext
        }
        None => OsString::from("tmp"),
    };
    path.with_extension(extension)
}

async fn write_to_temp_file<T, I>(temp_path: &Path, values: I) -> Result<()>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let file = File::create(temp_path).await?;
    let mut writer = BufWriter::new(file);
    for value in values {
        let line = serde_json::to_string(&value)?;
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    writer.flush().await?;
    writer.into_inner().sync_all().await?;
    Ok(())
}
