use super::path::PathExt;
use crate::internal_prelude::*;
use camino::{Utf8Path, Utf8PathBuf};
use std::path::Path;
use tokio::fs;
use walkdir::WalkDir;

pub async fn write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
    fs::write(&path, contents)
        .await
        .wrap_err(format!("Could not write to {:?}", path.as_ref()))
}

/// Writes the file when absent or when the content hash differs. Returns true if written.
pub async fn write_if_changed(path: &Utf8Path, contents: &[u8]) -> Result<bool> {
    if path.exists() {
        let current = self::read(path).await?;
        if seahash::hash(&current) == seahash::hash(contents) {
            return Ok(false);
        }
    } else if let Some(dir) = path.parent() {
        self::create_dir_all(dir).await?;
    }
    self::write(path, contents).await?;
    Ok(true)
}

/// Copies the file when the destination is absent or differs. Returns true if copied.
pub async fn copy_if_changed(from: &Utf8Path, to: &Utf8Path) -> Result<bool> {
    let data = self::read(from).await?;
    write_if_changed(to, &data).await
}

pub async fn create_dir_all<P: AsRef<Path>>(path: P) -> Result<()> {
    fs::create_dir_all(&path)
        .await
        .wrap_err(format!("Could not create {:?}", path.as_ref()))
}

pub async fn read<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    fs::read(&path)
        .await
        .wrap_err(format!("Could not read {:?}", path.as_ref()))
}

pub async fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
    fs::read_to_string(&path)
        .await
        .wrap_err(format!("Could not read to string {:?}", path.as_ref()))
}

pub async fn copy<P: AsRef<Path>, Q: AsRef<Path>>(from: P, to: Q) -> Result<u64> {
    fs::copy(&from, &to)
        .await
        .wrap_err(format!("copy {:?} to {:?}", from.as_ref(), to.as_ref()))
}

/// All regular files below `root`, sorted. A missing root yields no files.
pub fn files_under(root: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    if !root.exists() {
        debug!("Fs not listing {root:?} because it does not exist");
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.wrap_err(format!("Could not walk {root:?}"))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = Utf8PathBuf::from_path_buf(entry.into_path())
            .map_err(|p| eyre!("Not a UTF-8 path: {p:?}"))?;
        files.push(path);
    }
    Ok(files)
}

/// Copies every file below `src` to the same relative path below `dest`.
pub async fn mirror(src: &Utf8Path, dest: &Utf8Path) -> Result<usize> {
    let files = files_under(src)?;
    for from in &files {
        let to = from.rebase(src, dest)?;
        if let Some(dir) = to.parent() {
            self::create_dir_all(dir).await?;
        }
        self::copy(from, &to).await?;
    }
    Ok(files.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use temp_dir::TempDir;

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[tokio::test]
    async fn write_if_changed_skips_identical_content() {
        let dir = TempDir::new().unwrap();
        let file = utf8(&dir).join("css/main.css");

        assert!(write_if_changed(&file, b"a{}").await.unwrap());
        assert!(!write_if_changed(&file, b"a{}").await.unwrap());
        assert!(write_if_changed(&file, b"b{}").await.unwrap());
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "b{}");
    }

    #[tokio::test]
    async fn mirror_keeps_relative_layout() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let src_root = utf8(&src);
        std::fs::create_dir_all(src_root.join("common/fonts")).unwrap();
        std::fs::write(src_root.join("index.html"), "<html>").unwrap();
        std::fs::write(src_root.join("common/fonts/a.woff"), [0u8, 1, 2]).unwrap();

        let copied = mirror(&src_root, &utf8(&dest)).await.unwrap();

        assert_eq!(copied, 2);
        assert_eq!(
            std::fs::read(dest.path().join("common/fonts/a.woff")).unwrap(),
            vec![0u8, 1, 2]
        );
    }

    #[test]
    fn files_under_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let files = files_under(&utf8(&dir).join("nope")).unwrap();
        assert!(files.is_empty());
    }
}
