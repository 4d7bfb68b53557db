use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Writes through `fill` into a `.tmp` sibling of `path`, then renames it
/// over `path`. The target is untouched if `fill` fails.
pub(crate) fn write_atomic<F>(path: &Path, fill: F) -> Result<(), StoreError>
where
    F: FnOnce(&mut BufWriter<fs::File>) -> Result<(), StoreError>,
{
    let tmp = tmp_path(path);
    if let Some(parent) = tmp.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let file = fs::File::create(&tmp).map_err(|e| StoreError::io(&tmp, e))?;
    let mut writer = BufWriter::new(file);
    let result = fill(&mut writer).and_then(|()| {
        writer.flush().map_err(|e| StoreError::io(&tmp, e))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| StoreError::io(&tmp, e))
    });
    drop(writer);

    if let Err(e) = result {
        if let Err(cleanup) = fs::remove_file(&tmp) {
            tracing::warn!(path = %tmp.display(), error = %cleanup, "failed to remove temporary file");
        }
        return Err(e);
    }

    fs::rename(&tmp, path).map_err(|e| StoreError::io(path, e))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_fill_leaves_target_and_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xml");
        fs::write(&path, "old").unwrap();

        let result = write_atomic(&path, |w| {
            w.write_all(b"partial").map_err(|e| StoreError::io(&path, e))?;
            Err(StoreError::io(&path, std::io::Error::other("boom")))
        });

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
        assert!(!dir.path().join("out.xml.tmp").exists());
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/ids.json");
        write_atomic(&path, |w| w.write_all(b"[]").map_err(|e| StoreError::io(&path, e)))
            .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }
}
