//! Document I/O operations for assembly

use crate::types::*;
use lopdf::Document;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Fail unless `path` ends in `.{extension}`
pub fn validate_extension(path: &Path, extension: &'static str) -> Result<()> {
    if path.extension().and_then(|ext| ext.to_str()) == Some(extension) {
        Ok(())
    } else {
        Err(AssembleError::InvalidDestination {
            path: path.to_owned(),
            expected: extension,
        })
    }
}

/// Load a single PDF document
pub async fn load_pdf(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::fs::read(&path).await?;
    let doc = tokio::task::spawn_blocking(move || Document::load_mem(&bytes)).await??;
    Ok(doc)
}

/// Save a document; the file is synced to disk before this returns
pub async fn save_pdf(mut doc: Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::task::spawn_blocking(move || {
        let mut writer = Vec::new();
        doc.save_to(&mut writer)?;
        Ok::<_, AssembleError>(writer)
    })
    .await??;
    write_synced(&path, &bytes).await
}

/// Copy `from` to `to` byte for byte, syncing the destination.
///
/// Fails with [`AssembleError::SameFile`] when both paths name one file,
/// which would otherwise truncate it.
pub async fn copy_verbatim(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<u64> {
    let (from, to) = (from.as_ref(), to.as_ref());
    if is_same_file(from, to).await {
        return Err(AssembleError::SameFile { path: to.to_owned() });
    }
    let copied = tokio::fs::copy(from, to).await?;
    tokio::fs::File::open(to).await?.sync_all().await?;
    Ok(copied)
}

async fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (tokio::fs::canonicalize(a).await, tokio::fs::canonicalize(b).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

pub(crate) async fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    Ok(())
}
