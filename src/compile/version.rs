use super::compare::ChangedFiles;
use crate::{
    config::{Config, VersionMode},
    ext::{fs, PathExt},
    internal_prelude::*,
    logger::GRAY,
    signal::{Outcome, Product},
};
use camino::Utf8Path;
use derive_more::Display;
use itertools::Itertools;
use rand::Rng;
use regex::Regex;

/// Files whose references get versioned.
const REWRITTEN_EXTS: [&str; 3] = ["html", "css", "js"];

/// The query suffix shared by every rewritten reference of one run.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub struct VersionCode(u32);

impl VersionCode {
    pub fn new(code: u32) -> Self {
        Self(code)
    }

    pub fn random() -> Self {
        Self(rand::thread_rng().gen_range(1..=10000))
    }
}

pub async fn version(
    conf: &Config,
    changed: &ChangedFiles,
    code: VersionCode,
) -> Result<Outcome<Product>> {
    if changed.is_empty() {
        info!("Version skipped, no changed files");
        return Ok(Outcome::Success(Product::None));
    }
    let count = rewrite(
        &conf.build_dir,
        changed,
        &conf.server_url,
        code,
        conf.version_mode,
    )
    .await?;
    info!(
        "Version {} applied to {count} files ({} mode)",
        GRAY.paint(format!("?{code}")),
        conf.version_mode
    );
    Ok(Outcome::Success(Product::Version))
}

/// Matches any url starting with `server_url` and ending in one of the changed base names.
/// Group 1 holds the url without a previous version suffix, group 2 the character ending the url.
pub fn pattern(
    server_url: &str,
    changed: &ChangedFiles,
    mode: VersionMode,
) -> Result<Option<Regex>> {
    if changed.is_empty() {
        return Ok(None);
    }
    let names = changed
        .names()
        .iter()
        .unique()
        .map(|name| regex::escape(name))
        .join("|");
    let previous = match mode {
        VersionMode::Replace => r"(?:\?\d+)?",
        VersionMode::Append => "",
    };
    let source = format!(
        r#"(?i)({}[^\s"'()<>]*?(?:{names})){previous}([\s"'()<>?#]|$)"#,
        regex::escape(server_url)
    );
    trace!("Version pattern {}", GRAY.paint(&source));
    let re = Regex::new(&source).wrap_err("Could not build the version pattern")?;
    Ok(Some(re))
}

/// Appends `?<code>` to every matching reference in the html, css and js files of `build_dir`.
/// Returns the number of files that changed.
pub async fn rewrite(
    build_dir: &Utf8Path,
    changed: &ChangedFiles,
    server_url: &str,
    code: VersionCode,
    mode: VersionMode,
) -> Result<usize> {
    let Some(re) = pattern(server_url, changed, mode)? else {
        return Ok(0);
    };
    let replacement = format!("${{1}}?{code}${{2}}");

    let mut count = 0;
    for file in fs::files_under(build_dir)? {
        if !file.is_ext_any(&REWRITTEN_EXTS) {
            continue;
        }
        let text = fs::read_to_string(&file).await?;
        let versioned = re.replace_all(&text, replacement.as_str());
        if fs::write_if_changed(&file, versioned.as_bytes()).await? {
            debug!("Version rewrote {}", GRAY.paint(file.as_str()));
            count += 1;
        }
    }
    Ok(count)
}
