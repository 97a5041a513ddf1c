mod command;
pub mod compile;
pub mod config;
pub mod ext;
pub mod logger;
pub mod pipeline;
pub mod service;
pub mod signal;
mod internal_prelude {
    pub use crate::ext::{eyre::reexports::*, Paint as _};
    pub use tracing::*;
}

use crate::{
    config::{Cli, Commands, Config, CONFIG_FILE},
    logger::GRAY,
};
use camino::Utf8PathBuf;
use signal::Interrupt;
use std::{env, sync::Arc};

use crate::internal_prelude::*;

pub async fn run(args: Cli) -> Result<()> {
    let verbose = args.opts().map(|o| o.verbose).unwrap_or(0);
    logger::setup(verbose, &args.log);

    let cwd = env::current_dir().dot()?;
    let cwd = Utf8PathBuf::from_path_buf(cwd).map_err(|p| eyre!("Not a UTF-8 path: {p:?}"))?;
    let config_file = args
        .config
        .clone()
        .unwrap_or_else(|| Utf8PathBuf::from(CONFIG_FILE));

    let Some(opts) = args.opts() else {
        return command::init(&cwd.join(&config_file)).await;
    };

    let config = Config::load(&opts, &cwd, &config_file).dot()?;
    debug!(
        "Path working dir {}",
        GRAY.paint(config.working_dir.as_str())
    );
    let config = Arc::new(config);

    let _monitor = Interrupt::run_ctrl_c_monitor();
    use Commands::{Build, Dump, Init, Serve};
    match args.command {
        Build(_) | Dump(_) => command::build(&config).await.map(|_| ()),
        Serve(_) => command::serve(&config).await,
        Init => unreachable!(r#""init" command should have already been run"#),
    }
}
