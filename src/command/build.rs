use crate::{
    compile,
    config::Config,
    internal_prelude::*,
    logger::GRAY,
    signal::{Outcome, ProductSet},
};
use tokio::time::Instant;

/// Runs the whole pipeline once. Returns false when it was interrupted.
pub async fn build(conf: &Config) -> Result<bool> {
    let start_time = Instant::now();
    let plan = compile::plan(conf, None);
    if plan.is_empty() {
        warn!("Build has nothing to do, no bundle or copy set is configured");
    }

    match compile::run(conf, plan).await? {
        Outcome::Success(set) => {
            info!(
                "Build finished in {:?}{}",
                Instant::now() - start_time,
                summary(&set)
            );
            debug!("Build output in {}", GRAY.paint(conf.build_dir.as_str()));
            Ok(true)
        }
        Outcome::Stopped => {
            info!("Build interrupted");
            Ok(false)
        }
        Outcome::Failed => bail!("Build failed"),
    }
}

fn summary(set: &ProductSet) -> String {
    if set.is_empty() {
        ", nothing changed".to_string()
    } else {
        format!(", updated {set}")
    }
}
