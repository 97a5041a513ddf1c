
mod bundle;
mod cli;
mod dotenvs;
mod project;

use crate::{ext::PathExt, internal_prelude::*};
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;

pub use bundle::{Bundle, CopySet};
pub use cli::{Cli, Commands, Log, Opts, ServeOpts};
pub use dotenvs::ENV_VAR_FORGE_LESSC;
pub use project::{BundleKind, ProjectConfig, VersionMode, LOCAL_ENVIRONMENT};
use project::ensure_apart;

pub const CONFIG_FILE: &str = "forge.toml";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug)]
pub struct Config {
    /// absolute path to the directory holding the config file
    pub working_dir: Utf8PathBuf,
    pub work_dir: Utf8PathBuf,
    pub build_dir: Utf8PathBuf,
    pub production_dir: Utf8PathBuf,
    pub environment: String,
    pub port: u16,
    pub server_url: String,
    pub browserquery: String,
    pub version_mode: VersionMode,
    /// minify, version and dump
    pub production: bool,
    pub bundles: Vec<Arc<Bundle>>,
    pub copies: Vec<Arc<CopySet>>,
}

impl Config {
    pub fn load(opts: &Opts, cwd: &Utf8Path, config_file: &Utf8Path) -> Result<Self> {
        let config_file = cwd.join(config_file);
        let project = ProjectConfig::read(&config_file)?;
        let working_dir = config_file
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| cwd.to_path_buf());
        Self::resolve(project, &working_dir, opts.production)
    }

    pub fn resolve(
        project: ProjectConfig,
        working_dir: &Utf8Path,
        force_production: bool,
    ) -> Result<Self> {
        let work_dir = working_dir.join(&project.work_path);

        let bundles = project
            .bundles
            .iter()
            .map(|def| Bundle::resolve(def, &work_dir).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;
        let copies = project
            .copies
            .iter()
            .map(|def| CopySet::resolve(def, &work_dir).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;

        let build_dir = working_dir.join(&project.build_path).normalized();
        let production_dir = working_dir.join(&project.production_build_path).normalized();
        ensure_apart(&build_dir, &production_dir)?;

        let production = force_production || project.environment != LOCAL_ENVIRONMENT;

        Ok(Self {
            working_dir: working_dir.to_path_buf(),
            build_dir,
            production_dir,
            work_dir,
            environment: project.environment,
            port: project.port.unwrap_or(DEFAULT_PORT),
            server_url: project.server_url,
            browserquery: project.browserquery,
            version_mode: project.version_mode,
            production,
            bundles,
            copies,
        })
    }

    pub fn is_local(&self) -> bool {
        self.environment == LOCAL_ENVIRONMENT
    }
}

/// The default configuration, mirroring a classic less + jquery + bootstrap site.
pub const DEFAULT_CONFIG: &str = include_str!("forge.toml");
