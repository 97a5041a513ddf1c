use crate::{
    config::{Bundle, Config, ENV_VAR_FORGE_LESSC},
    ext::{
        fs,
        sync::{wait_piped_interruptible, CommandResult, OutputExt},
        PathExt,
    },
    internal_prelude::*,
    logger::GRAY,
    signal::{Interrupt, Outcome, Product},
};
use camino::{Utf8Path, Utf8PathBuf};
use lightningcss::{
    stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet},
    targets::{Browsers, Targets},
};
use std::env;
use tokio::process::Command;

/// Compiles the bundle sources (less or css), joins them and runs them through lightningcss.
pub async fn style(conf: &Config, bundle: &Bundle) -> Result<Outcome<Product>> {
    let mut pieces = Vec::with_capacity(bundle.files.len());
    for file in &bundle.files {
        if !file.exists() {
            warn!(
                "Style source not found, skipping {}",
                GRAY.paint(file.as_str())
            );
            continue;
        }
        let css = if file.is_ext_any(&["less"]) {
            match compile_less(file, &conf.work_dir).await? {
                Outcome::Success(css) => css,
                Outcome::Stopped => return Ok(Outcome::Stopped),
                Outcome::Failed => return Ok(Outcome::Failed),
            }
        } else {
            fs::read_to_string(file).await?
        };
        pieces.push(css);
    }

    if pieces.is_empty() {
        warn!("Style {} has no sources, nothing written", bundle.name);
        return Ok(Outcome::Success(Product::None));
    }

    let css = process_css(
        &pieces.join("\n"),
        &bundle.name,
        &conf.browserquery,
        conf.production,
    )?;

    let dest = conf.build_dir.join(&bundle.site_file);
    if fs::write_if_changed(&dest, css.as_bytes()).await? {
        debug!("Style finished with changes {}", GRAY.paint(dest.as_str()));
        Ok(Outcome::Success(Product::Style(bundle.site_file.to_string())))
    } else {
        trace!("Style finished without changes");
        Ok(Outcome::Success(Product::None))
    }
}

fn lessc() -> Result<Utf8PathBuf> {
    if let Ok(exe) = env::var(ENV_VAR_FORGE_LESSC) {
        return Ok(Utf8PathBuf::from(exe));
    }
    let found = which::which("lessc").map_err(|e| {
        eyre!("Could not find lessc ({e}). Install it with `npm install -g less` or set {ENV_VAR_FORGE_LESSC}")
    })?;
    Utf8PathBuf::from_path_buf(found).map_err(|p| eyre!("Not a UTF-8 path: {p:?}"))
}

async fn compile_less(file: &Utf8Path, include: &Utf8Path) -> Result<Outcome<String>> {
    let exe = lessc()?;
    let args = [format!("--include-path={include}"), file.to_string()];

    let mut cmd = Command::new(exe.as_str());
    cmd.args(&args);

    trace!(
        "Style running {}",
        GRAY.paint(format!("{exe} {}", args.join(" ")))
    );

    match wait_piped_interruptible("lessc", cmd, Interrupt::subscribe_any()).await? {
        CommandResult::Success(output) => Ok(Outcome::Success(output.stdout())),
        CommandResult::Interrupted => Ok(Outcome::Stopped),
        CommandResult::Failure(output) => {
            warn!("Style lessc failed on {file} with:");
            eprintln!("{}", output.stderr());
            Ok(Outcome::Failed)
        }
    }
}

fn browser_lists(query: &str) -> Result<Option<Browsers>> {
    Browsers::from_browserslist([query]).wrap_err(format!("Error in browserlist query: {query}"))
}

pub fn process_css(css: &str, filename: &str, browserquery: &str, minify: bool) -> Result<String> {
    let browsers = browser_lists(browserquery).wrap_err("forge.toml browserquery")?;
    let targets = Targets::from(browsers);

    let parse_options = ParserOptions {
        filename: filename.to_string(),
        ..Default::default()
    };

    let css = match StyleSheet::parse(css, parse_options) {
        Ok(mut stylesheet) => {
            if minify {
                stylesheet.minify(MinifyOptions {
                    targets,
                    ..Default::default()
                })?;
            }
            let options = PrinterOptions::<'_> {
                targets,
                minify,
                ..Default::default()
            };
            stylesheet.to_css(options)?.code
        }
        Err(e) => {
            trace!("Style unable to parse {filename}, falling back to the input css: {e}");
            css.to_string()
        }
    };
    Ok(css)
}
