pub mod backend;
pub mod session;

pub use backend::{LearnedBackend, MemoryBackend};
pub use session::Session;
