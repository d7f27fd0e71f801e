pub mod input;
pub mod list;
pub mod progress;
pub mod selector;
pub mod viewer;

pub use input::*;
pub use list::*;
pub use progress::*;
pub use selector::*;
pub use viewer::*;
