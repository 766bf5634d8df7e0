pub mod comment;
pub mod error;
pub mod priority;
pub mod task;

pub use comment::*;
pub use error::*;
pub use priority::*;
pub use task::*;
