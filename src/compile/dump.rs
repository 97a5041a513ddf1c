use crate::{
    config::Config,
    ext::fs,
    internal_prelude::*,
    logger::GRAY,
    signal::{Outcome, Product},
};

/// Copies the whole build output into the production path.
pub async fn dump(conf: &Config) -> Result<Outcome<Product>> {
    fs::create_dir_all(&conf.production_dir).await?;
    let count = fs::mirror(&conf.build_dir, &conf.production_dir)
        .await
        .wrap_err(format!(
            "dump {} into {}",
            conf.build_dir, conf.production_dir
        ))?;
    info!(
        "Dump copied {count} files to {}",
        GRAY.paint(conf.production_dir.as_str())
    );
    Ok(Outcome::Success(Product::Dump))
}
