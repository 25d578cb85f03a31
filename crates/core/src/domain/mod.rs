mod context;
mod message;
mod phase;
mod question;

pub use context::*;
pub use message::*;
pub use phase::*;
pub use question::*;
