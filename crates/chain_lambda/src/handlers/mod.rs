pub mod proxy;
pub mod trigger;
