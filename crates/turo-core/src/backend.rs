use std::collections::HashSet;
use std::io;
use std::sync::Mutex;

/// Durable storage for the learned-word set
pub trait LearnedBackend: Send + Sync {
    /// Last persisted set; empty when nothing was persisted or the data is unreadable
    fn load(&self) -> HashSet<String>;

    /// Replace the persisted set with `learned`
    fn save(&self, learned: &HashSet<String>) -> io::Result<()>;

    /// Remove the persisted state entirely
    fn clear(&self) -> io::Result<()>;
}

/// In-memory backend for tests and runs without persistence
#[derive(Default)]
pub struct MemoryBackend {
    learned: Mutex<HashSet<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_learned(learned: HashSet<String>) -> Self {
        Self {
            learned: Mutex::new(learned),
        }
    }
}

// Lets tests share one backend between two sessions.
impl LearnedBackend for std::sync::Arc<MemoryBackend> {
    fn load(&self) -> HashSet<String> {
        self.as_ref().load()
    }

    fn save(&self, learned: &HashSet<String>) -> io::Result<()> {
        self.as_ref().save(learned)
    }

    fn clear(&self) -> io::Result<()> {
        self.as_ref().clear()
    }
}

impl LearnedBackend for MemoryBackend {
    fn load(&self) -> HashSet<String> {
        self.learned.lock().unwrap().clone()
    }

    fn save(&self, learned: &HashSet<String>) -> io::Result<()> {
        *self.learned.lock().unwrap() = learned.clone();
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        self.learned.lock().unwrap().clear();
        Ok(())
    }
}
