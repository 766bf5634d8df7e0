pub mod config_store;
pub mod key_value;
pub mod observer;

pub use config_store::*;
pub use key_value::*;
pub use observer::*;
