use crate::{
    config::{Bundle, Config},
    ext::{eyre::AnyhowCompatWrapErr, fs},
    internal_prelude::*,
    logger::GRAY,
    signal::{Outcome, Product},
};
use std::sync::Arc;
use swc::{
    config::{IsModule, JsMinifyOptions},
    try_with_handler, BoolOrDataConfig, JsMinifyExtras,
};
use swc_common::{FileName, SourceMap, GLOBALS};

/// Concatenates the bundle sources in order and minifies the result in production.
pub async fn script(conf: &Config, bundle: &Bundle) -> Result<Outcome<Product>> {
    let mut pieces = Vec::with_capacity(bundle.files.len());
    for file in &bundle.files {
        if !file.exists() {
            warn!(
                "Script source not found, skipping {}",
                GRAY.paint(file.as_str())
            );
            continue;
        }
        pieces.push(fs::read_to_string(file).await?);
    }

    if pieces.is_empty() {
        warn!("Script {} has no sources, nothing written", bundle.name);
        return Ok(Outcome::Success(Product::None));
    }

    let mut js = pieces.join("\n");
    if conf.production {
        let start_time = tokio::time::Instant::now();
        js = minify(&js).wrap_err(format!("minify {}", bundle.name))?;
        debug!(
            "Script minified {} in {:?}",
            bundle.name,
            tokio::time::Instant::now() - start_time
        );
    }

    let dest = conf.build_dir.join(&bundle.site_file);
    if fs::write_if_changed(&dest, js.as_bytes()).await? {
        debug!("Script finished with changes {}", GRAY.paint(dest.as_str()));
        Ok(Outcome::Success(Product::Script(bundle.site_file.to_string())))
    } else {
        trace!("Script finished without changes");
        Ok(Outcome::Success(Product::None))
    }
}

pub fn minify<JS: AsRef<str>>(js: JS) -> Result<String> {
    let cm = Arc::<SourceMap>::default();

    let c = swc::Compiler::new(cm.clone());
    let output = GLOBALS
        .set(&Default::default(), || {
            try_with_handler(cm.clone(), Default::default(), |handler| {
                let fm = cm.new_source_file(Arc::new(FileName::Anon), js.as_ref().to_string());

                use anyhow::Context;

                c.minify(
                    fm,
                    handler,
                    &JsMinifyOptions {
                        compress: BoolOrDataConfig::from_bool(true),
                        mangle: BoolOrDataConfig::from_bool(true),
                        // bundles are classic scripts sharing the global scope
                        module: IsModule::Bool(false),
                        ..Default::default()
                    },
                    JsMinifyExtras::default(),
                )
                .context("failed to minify")
            })
        })
        .wrap_anyhow_err("Failed to minify")?;

    Ok(output.code)
}
