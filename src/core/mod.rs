pub mod export;
pub mod markdown;
pub mod prompt;
pub mod sections;
pub mod session;
pub mod summary;
pub mod transcript;

pub use export::*;
pub use markdown::*;
pub use prompt::*;
pub use sections::*;
pub use session::*;
pub use summary::*;
pub use transcript::*;
