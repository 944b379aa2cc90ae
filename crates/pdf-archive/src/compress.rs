//! ZIP compression of the staged folder

use crate::types::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Compress `source_dir` into `target`, storing entries under `prefix/`.
///
/// Returns the number of files written. The archive is finished and synced
/// to disk before this returns.
pub async fn compress_dir(source_dir: PathBuf, prefix: String, target: PathBuf) -> Result<usize> {
    tokio::task::spawn_blocking(move || compress_dir_sync(&source_dir, &prefix, &target)).await?
}

fn compress_dir_sync(source_dir: &Path, prefix: &str, target: &Path) -> Result<usize> {
    let mut zip = ZipWriter::new(File::create(target)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut files = 0;

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(source_dir) else {
            continue;
        };
        let name = entry_name(prefix, relative);

        if entry.file_type().is_dir() {
            zip.add_directory(format!("{name}/"), options)?;
        } else {
            zip.start_file(name, options)?;
            let mut file = File::open(entry.path())?;
            std::io::copy(&mut file, &mut zip)?;
            files += 1;
        }
    }

    let file = zip.finish()?;
    file.sync_all()?;
    log::debug!("Compressed {} file(s) into {}", files, target.display());
    Ok(files)
}

/// Forward-slash entry name, independent of the host separator
fn entry_name(prefix: &str, relative: &Path) -> String {
    std::iter::once(prefix.to_string())
        .chain(
            relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy().into_owned()),
        )
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_entry_name() {
        assert_eq!(entry_name("bundle", Path::new("")), "bundle");
        assert_eq!(
            entry_name("bundle", Path::new("images/01_a.jpg")),
            "bundle/images/01_a.jpg"
        );
    }

    #[tokio::test]
    async fn test_compress_prefixes_entries() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("stage");
        std::fs::create_dir_all(source.join("images")).unwrap();
        std::fs::write(source.join("items.json"), b"{}").unwrap();
        std::fs::write(source.join("images/01_a.jpg"), b"jpeg bytes").unwrap();

        let target = dir.path().join("out.zip");
        let files = compress_dir(source, "bundle".to_string(), target.clone())
            .await
            .unwrap();
        assert_eq!(files, 2);

        let mut archive = zip::ZipArchive::new(File::open(&target).unwrap()).unwrap();
        let mut contents = String::new();
        archive
            .by_name("bundle/images/01_a.jpg")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "jpeg bytes");
        assert!(archive.by_name("bundle/items.json").is_ok());
        assert!(archive.file_names().all(|name| name.starts_with("bundle/")));
    }
}
