mod build;
mod init;
mod serve;
pub mod watch;

pub use build::build;
pub use init::init;
pub use serve::serve;
pub use watch::watch;
