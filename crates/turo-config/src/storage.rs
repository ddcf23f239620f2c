use std::env;

use serde::{Deserialize, Serialize};

fn default_data_dir() -> String {
    ".turo".to_string()
}

fn default_learned_key() -> String {
    "learnedWords".to_string()
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Key (file stem) under which the learned set is persisted
    #[serde(default = "default_learned_key")]
    pub learned_key: String,
}

impl StorageConfig {
    pub fn new() -> Self {
        let data_dir = env::var("TURO_DATA_DIR").unwrap_or_else(|_| default_data_dir());

        StorageConfig {
            data_dir,
            learned_key: default_learned_key(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            learned_key: default_learned_key(),
        }
    }
}
