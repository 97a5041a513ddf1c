use super::build;
use crate::{
    compile,
    config::Config,
    internal_prelude::*,
    service,
    signal::{Interrupt, Outcome, ProductSet, ReloadSignal},
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

pub async fn watch(conf: &Arc<Config>) -> Result<()> {
    if !build(conf).await.dot()? {
        return Ok(());
    }

    let _watch = service::notify::spawn(conf)?;
    let server = service::serve::spawn(conf).await;

    let res = run_loop(conf).await;
    if res.is_err() {
        Interrupt::request_shutdown().await;
    }
    server.await.dot()??;
    res
}

pub async fn run_loop(conf: &Config) -> Result<()> {
    let mut int = Interrupt::subscribe_any();
    loop {
        debug!("Watch waiting for changes");
        match int.recv().await {
            Ok(()) | Err(RecvError::Lagged(_)) => {}
            Err(e) => return Err(e).dot(),
        }

        if Interrupt::is_shutdown_requested().await {
            debug!("Watch shutting down");
            return Ok(());
        }

        let changes = Interrupt::get_source_changes().await;
        let plan = compile::plan(conf, Some(&changes));
        if plan.is_empty() {
            trace!("Watch has no step for the changes");
            Interrupt::clear_source_changes().await;
            continue;
        }

        match compile::run(conf, plan).await {
            Ok(Outcome::Success(set)) => {
                reload(&set);
                Interrupt::clear_source_changes().await;
            }
            Ok(Outcome::Stopped) => info!("Watch interrupted. Restarting build step."),
            Ok(Outcome::Failed) => {
                warn!("Watch build failed, waiting for changes");
                Interrupt::clear_source_changes().await;
            }
            Err(e) => {
                error!("Watch build failed, waiting for changes: {e:?}");
                Interrupt::clear_source_changes().await;
            }
        }
    }
}

fn reload(set: &ProductSet) {
    if set.is_empty() {
        trace!("Watch build done with no changes");
    } else if set.only_style() {
        let sheets: Vec<String> = set.styles().into_iter().map(String::from).collect();
        ReloadSignal::send_style(sheets);
        info!("Watch updated style {set}");
    } else {
        ReloadSignal::send_full();
        info!("Watch updated {set}");
    }
}
