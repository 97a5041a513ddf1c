
pub mod notify;
pub mod reload;
pub mod serve;
