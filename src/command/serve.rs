use super::{build, watch};
use crate::{config::Config, internal_prelude::*};
use std::sync::Arc;

/// What `serve` does for an environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// build, start the dev server and rebuild on changes
    Develop,
    /// production build and dump, then return without serving
    ProductionThenExit,
}

impl Flow {
    pub fn of(conf: &Config) -> Self {
        if conf.is_local() {
            Self::Develop
        } else {
            Self::ProductionThenExit
        }
    }
}

pub async fn serve(conf: &Arc<Config>) -> Result<()> {
    match Flow::of(conf) {
        Flow::Develop => watch(conf).await,
        Flow::ProductionThenExit => {
            info!(
                r#"Serve skipped for environment "{}", running the production dump"#,
                conf.environment
            );
            build(conf).await.dot()?;
            Ok(())
        }
    }
}
