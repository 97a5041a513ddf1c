mod interrupt;
mod product;
mod reload;

pub use interrupt::Interrupt;
pub use product::{Outcome, Product, ProductSet};
pub use reload::{ReloadSignal, ReloadType};
