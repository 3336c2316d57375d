use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::types::ResultSnapshot;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Snapshot I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Snapshot JSON error in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Pretty JSON with four-space indentation. Non-ASCII is written as-is.
///
/// Top-level keys come out in page order and are trimmed constituency names
/// (`"Narela"`, not `"Narela "` as the label reads before trimming).
pub fn to_json(snapshot: &ResultSnapshot) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    snapshot.serialize(&mut ser)?;
    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn write_snapshot(
    path: impl AsRef<Path>,
    snapshot: &ResultSnapshot,
) -> Result<(), SnapshotError> {
    let path = path.as_ref();
    let json = to_json(snapshot).map_err(|source| SnapshotError::Json {
        path: path.display().to_string(),
        source,
    })?;

    fs::write(path, json).map_err(|source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    })?;

    log::info!(
        "Results saved to {} ({} constituencies)",
        path.display(),
        snapshot.len()
    );
    Ok(())
}

pub fn read_snapshot(path: impl AsRef<Path>) -> Result<ResultSnapshot, SnapshotError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.display().to_string(),
        source,
    })?;

    serde_json::from_str(&json).map_err(|source| SnapshotError::Json {
        path: path.display().to_string(),
        source,
    })
}
