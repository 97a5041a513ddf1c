use crate::internal_prelude::*;
use std::process::{Output, Stdio};
use tokio::{process::Command, sync::broadcast};

pub enum CommandResult {
    Success(Output),
    Failure(Output),
    Interrupted,
}

pub trait OutputExt {
    fn stdout(&self) -> String;
    fn stderr(&self) -> String;
}

impl OutputExt for Output {
    fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }
}

/// Runs the command capturing its output. The child is killed if an interrupt arrives first.
pub async fn wait_piped_interruptible(
    name: &str,
    mut cmd: Command,
    mut interrupt_rx: broadcast::Receiver<()>,
) -> Result<CommandResult> {
    let child = cmd
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .wrap_err(format!("Could not spawn {name}"))?;

    tokio::select! {
        res = child.wait_with_output() => match res {
            Ok(output) if output.status.success() => {
                trace!("{name} process finished with success");
                Ok(CommandResult::Success(output))
            }
            Ok(output) => {
                trace!("{name} process finished with code {:?}", output.status.code());
                Ok(CommandResult::Failure(output))
            }
            Err(e) => bail!("Command failed due to: {e}"),
        },
        _ = interrupt_rx.recv() => {
            trace!("{name} process interrupted");
            Ok(CommandResult::Interrupted)
        }
    }
}
