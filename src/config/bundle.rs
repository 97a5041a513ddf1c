use super::project::{BundleDefinition, BundleKind, CopyDefinition};
use crate::{ext::PathBufExt, internal_prelude::*};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{GlobBuilder, GlobMatcher};

/// A named group of source files concatenated into one output file.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub name: String,
    pub kind: BundleKind,
    /// absolute source files, in concatenation order
    pub files: Vec<Utf8PathBuf>,
    /// output file, relative to the build dir
    pub site_file: Utf8PathBuf,
}

impl Bundle {
    pub fn resolve(def: &BundleDefinition, work_dir: &Utf8Path) -> Result<Self> {
        let kind = match def.kind {
            Some(kind) => kind,
            None => BundleKind::infer(&def.name).ok_or_else(|| {
                eyre!(
                    r#"Bundle "{}" needs a kind ("style" or "script"), it cannot be inferred from the name"#,
                    def.name
                )
            })?,
        };
        Ok(Self {
            name: def.name.clone(),
            kind,
            files: def.files.iter().map(|f| work_dir.join(f)).collect(),
            site_file: def.dest.join(&def.name),
        })
    }

    /// directories holding the sources, watched for imported styles
    pub fn source_dirs(&self) -> Vec<Utf8PathBuf> {
        let mut dirs: Vec<Utf8PathBuf> = self
            .files
            .iter()
            .map(|f| f.clone().without_last())
            .collect();
        dirs.dedup();
        dirs
    }
}

/// A named glob of files copied verbatim into the build.
#[derive(Debug, Clone)]
pub struct CopySet {
    pub name: String,
    /// absolute directory the pattern is relative to
    pub base: Utf8PathBuf,
    pub pattern: String,
    matcher: GlobMatcher,
    /// relative to the build dir
    pub dest: Utf8PathBuf,
}

impl CopySet {
    pub fn resolve(def: &CopyDefinition, work_dir: &Utf8Path) -> Result<Self> {
        let matcher = GlobBuilder::new(&def.pattern)
            .literal_separator(true)
            .build()
            .wrap_err(format!(r#"Copy "{}" has an invalid pattern"#, def.name))?
            .compile_matcher();
        Ok(Self {
            name: def.name.clone(),
            base: work_dir.join(&def.base),
            pattern: def.pattern.clone(),
            matcher,
            dest: def.dest.clone(),
        })
    }

    /// `rel` is relative to the base directory
    pub fn matches(&self, rel: &Utf8Path) -> bool {
        self.matcher.is_match(rel.as_std_path())
    }

    /// true for an absolute path below the base that matches the pattern
    pub fn covers(&self, path: &Utf8Path) -> bool {
        path.strip_prefix(&self.base)
            .map(|rel| self.matches(rel))
            .unwrap_or(false)
    }
}
