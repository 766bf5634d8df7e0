pub mod board;
pub mod error;
pub mod persistence;
pub mod task_store;

pub use board::*;
pub use error::*;
pub use persistence::*;
pub use task_store::*;
