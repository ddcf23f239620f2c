pub mod learned;
pub mod words;

pub use learned::LearnedFile;
pub use words::{LoadError, load_words};
