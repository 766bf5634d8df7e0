pub mod task_form;
pub mod text_input;

pub use task_form::*;
pub use text_input::*;
