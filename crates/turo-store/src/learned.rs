use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use turo_core::LearnedBackend;

/// File-backed learned-word storage: one JSON array of identity strings
/// under `<data_dir>/<key>.json`.
pub struct LearnedFile {
    path: PathBuf,
}

impl LearnedFile {
    pub fn new(data_dir: &Path, key: &str) -> Self {
        Self {
            path: data_dir.join(format!("{key}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LearnedBackend for LearnedFile {
    fn load(&self) -> HashSet<String> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(_) => return HashSet::new(),
        };

        match serde_json::from_str::<Vec<String>>(&text) {
            Ok(words) => words.into_iter().collect(),
            Err(e) => {
                // Corrupt data counts as "nothing learned", never as an error.
                tracing::warn!("discarding unparseable learned-word file: {e}");
                HashSet::new()
            }
        }
    }

    fn save(&self, learned: &HashSet<String>) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        // Stable on-disk order keeps the file diffable.
        let mut words: Vec<&String> = learned.iter().collect();
        words.sort();

        let json = serde_json::to_string(&words).map_err(io::Error::from)?;
        fs::write(&self.path, json)
    }

    fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}
