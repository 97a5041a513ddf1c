use crate::{
    config::Config,
    ext::{fs, PathExt},
    internal_prelude::*,
    logger::GRAY,
    signal::Outcome,
};
use camino::Utf8Path;
use sha1::{Digest, Sha1};
use std::fmt;

/// Base names of the build files that are new or differ from the production output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangedFiles(Vec<String>);

impl ChangedFiles {
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }
}

impl fmt::Display for ChangedFiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

pub async fn compare(conf: &Config) -> Result<Outcome<ChangedFiles>> {
    let changed = changed_files(&conf.build_dir, &conf.production_dir).await?;
    if changed.is_empty() {
        info!("Compare found no changed files");
    } else {
        info!("Compare found {} changed files", changed.len());
        debug!("Compare changed {}", GRAY.paint(changed.to_string()));
    }
    Ok(Outcome::Success(changed))
}

/// Compares every file under `build_dir` with the file at the same relative path
/// under `prod_dir` by SHA-1 digest.
pub async fn changed_files(build_dir: &Utf8Path, prod_dir: &Utf8Path) -> Result<ChangedFiles> {
    let files = fs::files_under(build_dir)?;
    let prod_exists = prod_dir.exists();
    if !prod_exists {
        debug!("Compare {} missing, everything changed", GRAY.paint(prod_dir.as_str()));
    }

    let mut changed = Vec::new();
    for file in files {
        let Some(name) = file.file_name().map(str::to_string) else {
            continue;
        };
        if !prod_exists {
            changed.push(name);
            continue;
        }
        let prod_file = file.rebase(build_dir, prod_dir)?;
        let current = fs::read(&file).await?;
        if !same_digest(&current, &prod_file).await {
            trace!("Compare changed {}", GRAY.paint(file.as_str()));
            changed.push(name);
        }
    }
    Ok(ChangedFiles(changed))
}

async fn same_digest(current: &[u8], prod_file: &Utf8Path) -> bool {
    if !prod_file.exists() {
        return false;
    }
    match tokio::fs::read(prod_file).await {
        Ok(previous) => Sha1::digest(current) == Sha1::digest(&previous),
        Err(e) => {
            warn!("Compare could not read {prod_file}, treating it as changed: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use temp_dir::TempDir;

    fn write(root: &Utf8Path, rel: &str, content: &str) {
        let file = root.join(rel);
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(file, content).unwrap();
    }

    fn trees() -> (TempDir, Utf8PathBuf, Utf8PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        (dir, root.join("build"), root.join("production"))
    }

    #[tokio::test]
    async fn identical_files_are_excluded() {
        let (_dir, build, prod) = trees();
        write(&build, "css/main.css", "a{}");
        write(&prod, "css/main.css", "a{}");
        write(&build, "js/main.js", "let a = 2;");
        write(&prod, "js/main.js", "let a = 1;");
        write(&build, "index.html", "<html>");

        let changed = changed_files(&build, &prod).await.unwrap();
        assert_eq!(changed.len(), 2);
        assert!(changed.contains("index.html"));
        assert!(changed.contains("main.js"));
        assert!(!changed.contains("main.css"));
    }

    #[tokio::test]
    async fn missing_production_dir_changes_everything() {
        let (_dir, build, prod) = trees();
        write(&build, "css/main.css", "a{}");
        write(&build, "common/images/logo.svg", "<svg/>");

        let changed = changed_files(&build, &prod).await.unwrap();
        assert_eq!(changed.names(), ["logo.svg", "main.css"]);
    }

    #[tokio::test]
    async fn empty_build_has_no_changes() {
        let (_dir, build, prod) = trees();
        let changed = changed_files(&build, &prod).await.unwrap();
        assert!(changed.is_empty());
    }
}
