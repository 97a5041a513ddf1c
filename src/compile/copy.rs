use crate::{
    config::{Config, CopySet},
    ext::{fs, PathExt},
    internal_prelude::*,
    logger::GRAY,
    signal::{Outcome, Product},
};

/// Copies every file of the set that is new or differs from the build output.
pub async fn copy(conf: &Config, set: &CopySet) -> Result<Outcome<Product>> {
    let dest_root = conf.build_dir.join(&set.dest);
    let mut copied = 0;
    let mut matched = 0;

    for file in fs::files_under(&set.base)? {
        // the build output may live below the work dir
        if file.starts_with(&conf.build_dir) || file.starts_with(&conf.production_dir) {
            continue;
        }
        let rel = file.unbase(&set.base)?;
        if !set.matches(&rel) {
            continue;
        }
        matched += 1;
        let to = dest_root.join(&rel);
        if fs::copy_if_changed(&file, &to).await? {
            trace!("Copy {} -> {}", GRAY.paint(file.as_str()), GRAY.paint(to.as_str()));
            copied += 1;
        }
    }

    debug!(
        "Copy {} finished, {copied} of {matched} files copied",
        set.name
    );
    if copied > 0 {
        Ok(Outcome::Success(Product::Copy(set.name.clone())))
    } else {
        Ok(Outcome::Success(Product::None))
    }
}
