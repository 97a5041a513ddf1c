use crate::{ext::PathExt, internal_prelude::*};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::{fmt, str::FromStr};

use super::dotenvs::{load_dotenvs, overlay_env};

pub const LOCAL_ENVIRONMENT: &str = "local";

/// The content of `forge.toml`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProjectConfig {
    /// sources: less, js, views, images and fonts
    #[serde(default = "default_work_path")]
    pub work_path: Utf8PathBuf,
    /// output of every build
    #[serde(default = "default_build_path")]
    pub build_path: Utf8PathBuf,
    /// the build is copied here by the production dump
    #[serde(default = "default_production_build_path")]
    pub production_build_path: Utf8PathBuf,
    #[serde(default = "default_environment")]
    pub environment: String,
    /// dev server port
    pub port: Option<u16>,
    /// prefix of the urls rewritten by the version step
    #[serde(default)]
    pub server_url: String,
    #[serde(default = "default_browserquery")]
    pub browserquery: String,
    #[serde(default)]
    pub version_mode: VersionMode,
    #[serde(default, rename = "bundle")]
    pub bundles: Vec<BundleDefinition>,
    #[serde(default, rename = "copy")]
    pub copies: Vec<CopyDefinition>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct BundleDefinition {
    /// output file name, e.g. `main.css`
    pub name: String,
    /// inferred from the name's extension when absent
    pub kind: Option<BundleKind>,
    #[serde(default)]
    pub dest: Utf8PathBuf,
    pub files: Vec<Utf8PathBuf>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CopyDefinition {
    pub name: String,
    #[serde(default)]
    pub base: Utf8PathBuf,
    pub pattern: String,
    #[serde(default)]
    pub dest: Utf8PathBuf,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BundleKind {
    Style,
    Script,
}

impl BundleKind {
    pub fn infer(name: &str) -> Option<Self> {
        let ext = Utf8Path::new(name).extension()?;
        match ext.to_ascii_lowercase().as_str() {
            "css" => Some(Self::Style),
            "js" => Some(Self::Script),
            _ => None,
        }
    }
}

/// How the version step treats a url that already carries a `?<digits>` suffix.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VersionMode {
    /// the existing suffix is replaced
    #[default]
    Replace,
    /// the new suffix is inserted and the existing one kept
    Append,
}

impl FromStr for VersionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "replace" => Ok(Self::Replace),
            "append" => Ok(Self::Append),
            _ => bail!(r#"Unknown version-mode "{s}", expected "replace" or "append""#),
        }
    }
}

impl fmt::Display for VersionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => write!(f, "replace"),
            Self::Append => write!(f, "append"),
        }
    }
}

impl ProjectConfig {
    /// Reads the file and applies `.env` and `FORGE_*` environment overrides.
    pub fn read(file: &Utf8Path) -> Result<Self> {
        let text = std::fs::read_to_string(file).wrap_err(format!("read config: {file}"))?;
        trace!("Config file content:\n{text}");
        let mut conf = Self::parse(&text).wrap_err(format!("parse config: {file}"))?;

        let dir = file.parent().unwrap_or(Utf8Path::new("."));
        let dotenvs = load_dotenvs(dir)?;
        overlay_env(&mut conf, dotenvs)?;
        conf.validate()?;
        Ok(conf)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn validate(&self) -> Result<()> {
        for path in [&self.build_path, &self.production_build_path] {
            let norm = path.normalized();
            if norm == "/" || norm.as_str().is_empty() {
                bail!("build paths cannot be '{path}'. All the content is overwritten when building.");
            }
        }
        ensure_apart(&self.build_path, &self.production_build_path)?;

        let mut names: Vec<&str> = self
            .bundles
            .iter()
            .map(|b| b.name.as_str())
            .chain(self.copies.iter().map(|c| c.name.as_str()))
            .collect();
        names.sort_unstable();
        if let Some(dup) = names.windows(2).find(|w| w[0] == w[1]) {
            bail!(r#"The name "{}" is used by more than one bundle or copy set"#, dup[0]);
        }
        Ok(())
    }
}

/// Fails when both paths name the same directory or one lies inside the other.
pub fn ensure_apart(build: &Utf8Path, production: &Utf8Path) -> Result<()> {
    let (b, p) = (build.normalized(), production.normalized());
    ensure!(
        !b.starts_with(&p) && !p.starts_with(&b),
        "build-path '{build}' and production-build-path '{production}' must be separate directories, neither inside the other"
    );
    Ok(())
}

fn default_work_path() -> Utf8PathBuf {
    Utf8PathBuf::from("app")
}

fn default_build_path() -> Utf8PathBuf {
    Utf8PathBuf::from("build")
}

fn default_production_build_path() -> Utf8PathBuf {
    Utf8PathBuf::from("production")
}

fn default_environment() -> String {
    LOCAL_ENVIRONMENT.to_string()
}

fn default_browserquery() -> String {
    "defaults".to_string()
}
