use super::ProjectConfig;
use crate::internal_prelude::*;
use camino::{Utf8Path, Utf8PathBuf};
use std::{env, fs};

pub const ENV_VAR_FORGE_LESSC: &str = "FORGE_LESSC";

/// Finds the closest `.env` file, looking in `directory` and then its parents.
pub fn load_dotenvs(directory: &Utf8Path) -> Result<Option<Vec<(String, String)>>> {
    let candidate = directory.join(".env");

    if let Ok(metadata) = fs::metadata(&candidate) {
        if metadata.is_file() {
            let mut dotenvs = vec![];
            for entry in dotenvy::from_path_iter(&candidate)? {
                let (key, val) = entry?;
                dotenvs.push((key, val));
            }

            return Ok(Some(dotenvs));
        }
    }

    if let Some(parent) = directory.parent() {
        load_dotenvs(parent)
    } else {
        Ok(None)
    }
}

pub fn overlay_env(
    conf: &mut ProjectConfig,
    dotenvs: Option<Vec<(String, String)>>,
) -> Result<()> {
    if let Some(dotenvs) = dotenvs {
        overlay(conf, dotenvs.into_iter())?;
    }
    overlay(conf, env::vars())?;
    Ok(())
}

pub(super) fn overlay(
    conf: &mut ProjectConfig,
    envs: impl Iterator<Item = (String, String)>,
) -> Result<()> {
    for (key, val) in envs {
        match key.as_str() {
            "FORGE_WORK_PATH" => conf.work_path = Utf8PathBuf::from(val),
            "FORGE_BUILD_PATH" => conf.build_path = Utf8PathBuf::from(val),
            "FORGE_PRODUCTION_BUILD_PATH" => conf.production_build_path = Utf8PathBuf::from(val),
            "FORGE_ENVIRONMENT" => conf.environment = val,
            "FORGE_PORT" => conf.port = Some(val.parse().wrap_err(format!("FORGE_PORT={val}"))?),
            "FORGE_SERVER_URL" => conf.server_url = val,
            "FORGE_BROWSERQUERY" => conf.browserquery = val,
            "FORGE_VERSION_MODE" => conf.version_mode = val.parse()?,
            // read by the style step when it looks for lessc
            ENV_VAR_FORGE_LESSC => {}
            _ if key.starts_with("FORGE_") => {
                warn!("Env {key} is not used by asset-forge")
            }
            _ => {}
        }
    }
    Ok(())
}
