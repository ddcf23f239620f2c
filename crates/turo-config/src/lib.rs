use std::env;

use serde::{Deserialize, Serialize};

use self::inference::InferenceConfig;
use self::storage::StorageConfig;

pub mod inference;
pub mod storage;

#[derive(Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub inference: InferenceConfig,

    /// Path to the word list document
    pub words_path: String,
}

impl Config {
    pub fn new() -> Self {
        let words_path = env::var("TURO_WORDS").unwrap_or_else(|_| "words.json".to_string());

        Config {
            storage: StorageConfig::new(),
            inference: InferenceConfig::new(),
            words_path,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
