use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Log {
    /// Dev server and live reload (hyper, axum, tower)
    Server,
    /// File watcher (notify)
    Watch,
}

#[derive(Debug, Clone, Parser, PartialEq, Default)]
pub struct Opts {
    /// Minify, version changed files and dump into the production build path,
    /// regardless of the configured environment.
    #[arg(short = 'P', long)]
    pub production: bool,

    /// Verbosity (none: info, errors & warnings, -v: verbose, -vv: very verbose).
    #[arg(short, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Options of `serve`. Production follows the configured environment alone.
#[derive(Debug, Clone, Parser, PartialEq, Default)]
pub struct ServeOpts {
    /// Verbosity (none: info, errors & warnings, -v: verbose, -vv: very verbose).
    #[arg(short, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Parser)]
#[clap(version)]
pub struct Cli {
    /// Path to the forge.toml configuration file.
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Output logs from dependencies (multiple --log accepted).
    #[arg(long)]
    pub log: Vec<Log>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn opts(&self) -> Option<Opts> {
        match &self.command {
            Commands::Build(opts) => Some(opts.clone()),
            Commands::Serve(opts) => Some(Opts {
                production: false,
                verbose: opts.verbose,
            }),
            Commands::Dump(opts) => Some(Opts {
                production: true,
                ..opts.clone()
            }),
            Commands::Init => None,
        }
    }
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum Commands {
    /// Build all bundles and copy sets once.
    Build(Opts),
    /// Build, then serve with live reload when the environment is local.
    /// Otherwise run the production dump and exit.
    Serve(ServeOpts),
    /// Production build: minify, version changed files, copy to the production path.
    Dump(Opts),
    /// Write a default forge.toml into the current directory.
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_always_runs_production() {
        let cli = Cli::parse_from(["asset-forge", "dump"]);
        assert!(cli.opts().unwrap().production);

        let cli = Cli::parse_from(["asset-forge", "build", "-vv"]);
        let opts = cli.opts().unwrap();
        assert!(!opts.production);
        assert_eq!(opts.verbose, 2);
    }

    #[test]
    fn log_flags_accumulate() {
        let cli = Cli::parse_from([
            "asset-forge",
            "--log",
            "server",
            "--log",
            "watch",
            "--config",
            "site/forge.toml",
            "serve",
        ]);
        assert_eq!(cli.log, vec![Log::Server, Log::Watch]);
        assert_eq!(cli.config, Some(Utf8PathBuf::from("site/forge.toml")));
        assert_eq!(cli.command, Commands::Serve(ServeOpts::default()));
    }

    #[test]
    fn serve_takes_production_from_the_environment() {
        assert!(Cli::try_parse_from(["asset-forge", "serve", "-P"]).is_err());

        let cli = Cli::parse_from(["asset-forge", "serve", "-v"]);
        let opts = cli.opts().unwrap();
        assert!(!opts.production);
        assert_eq!(opts.verbose, 1);
    }
}
