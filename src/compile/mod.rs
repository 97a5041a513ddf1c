#[cfg(test)]
mod tests;

mod change;
mod compare;
mod copy;
mod dump;
mod script;
mod style;
mod version;

pub use change::{Change, ChangeSet};
pub use compare::{changed_files, compare, ChangedFiles};
pub use copy::copy;
pub use dump::dump;
pub use script::{minify, script};
pub use style::{process_css, style};
pub use version::{rewrite, version, VersionCode};

use crate::{
    config::{Bundle, BundleKind, Config, CopySet},
    internal_prelude::*,
    pipeline::{describe, Pipeline},
    signal::{Outcome, Product, ProductSet},
};
use std::sync::Arc;
use tokio::time::Instant;

pub const COMPARE_STEP: &str = "compare";
pub const VERSION_STEP: &str = "version";
pub const DUMP_STEP: &str = "dump";

#[derive(Debug, Clone)]
pub enum Task {
    Bundle(Arc<Bundle>),
    Copy(Arc<CopySet>),
    /// find the build files that differ from the production output
    Compare,
    /// cache-bust references to the changed files
    Version,
    /// mirror the build into the production path
    Dump,
}

/// One step per bundle and copy set, in config order. In production the
/// compare, version and dump steps follow all of them.
///
/// With `only`, build steps not marked in the change set are left out.
pub fn plan(conf: &Config, only: Option<&ChangeSet>) -> Pipeline<Task> {
    let wanted = |name: &str| only.map(|changes| changes.needs(name)).unwrap_or(true);

    let mut pipeline = Pipeline::new();
    for bundle in conf.bundles.iter().filter(|b| wanted(&b.name)) {
        pipeline = pipeline.step(&bundle.name, &[], Task::Bundle(bundle.clone()));
    }
    for set in conf.copies.iter().filter(|c| wanted(&c.name)) {
        pipeline = pipeline.step(&set.name, &[], Task::Copy(set.clone()));
    }

    if conf.production {
        let built: Vec<String> = pipeline.names().into_iter().map(String::from).collect();
        let after: Vec<&str> = built.iter().map(String::as_str).collect();
        pipeline = pipeline
            .step(COMPARE_STEP, &after, Task::Compare)
            .step(VERSION_STEP, &[COMPARE_STEP], Task::Version)
            .step(DUMP_STEP, &[VERSION_STEP], Task::Dump);
    }
    pipeline
}

/// Runs the steps one after the other, each one finishing before the next starts.
pub async fn run(conf: &Config, pipeline: Pipeline<Task>) -> Result<Outcome<ProductSet>> {
    let steps = pipeline.ordered()?;
    debug!("Pipeline {}", describe(&steps));

    let code = VersionCode::random();
    let mut changed: Option<ChangedFiles> = None;
    let mut products = ProductSet::empty();

    for step in steps {
        let start_time = Instant::now();
        let outcome = run_step(conf, &step.task, &mut changed, code)
            .await
            .wrap_err(format!(r#"step "{}""#, step.name))?;
        match outcome {
            Outcome::Success(product) => {
                debug!(
                    "Pipeline step {} finished in {:?}",
                    step.name,
                    Instant::now() - start_time
                );
                products.insert(product);
            }
            Outcome::Stopped => {
                info!("Pipeline stopped at step {}", step.name);
                return Ok(Outcome::Stopped);
            }
            Outcome::Failed => bail!(r#"step "{}" failed"#, step.name),
        }
    }
    Ok(Outcome::Success(products))
}

async fn run_step(
    conf: &Config,
    task: &Task,
    changed: &mut Option<ChangedFiles>,
    code: VersionCode,
) -> Result<Outcome<Product>> {
    match task {
        Task::Bundle(bundle) => match bundle.kind {
            BundleKind::Style => style(conf, bundle).await,
            BundleKind::Script => script(conf, bundle).await,
        },
        Task::Copy(set) => copy(conf, set).await,
        Task::Compare => match compare(conf).await? {
            Outcome::Success(files) => {
                *changed = Some(files);
                Ok(Outcome::Success(Product::None))
            }
            Outcome::Stopped => Ok(Outcome::Stopped),
            Outcome::Failed => Ok(Outcome::Failed),
        },
        Task::Version => {
            let files = changed
                .as_ref()
                .ok_or_else(|| eyre!("Version needs the changed files, run {COMPARE_STEP} first"))?;
            version(conf, files, code).await
        }
        Task::Dump => dump(conf).await,
    }
}
