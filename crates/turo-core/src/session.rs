use std::collections::HashSet;

use rand::Rng;
use turo_types::{Direction, SessionPhase, WordList, WordPair};

use crate::backend::LearnedBackend;

/// Flashcard session over one loaded word list.
///
/// Owns the current direction, the pool of not-yet-learned words, the
/// displayed word and the learned set. Every mutation of the learned set is
/// persisted through the backend before the call returns.
pub struct Session<R: Rng> {
    words: WordList,
    direction: Direction,
    pool: Vec<WordPair>,
    current: Option<WordPair>,
    revealed: bool,
    learned: HashSet<String>,
    total_words: usize,
    backend: Box<dyn LearnedBackend>,
    rng: R,
}

impl<R: Rng> Session<R> {
    /// Build the initial state from the loaded word list and whatever the
    /// backend remembers, then draw the first word.
    pub fn new(words: WordList, backend: Box<dyn LearnedBackend>, rng: R) -> Self {
        let mut learned = backend.load();

        // Stale identities (word file changed since last run) must not count
        // towards progress: the learned set stays a subset of the ordering.
        let known: HashSet<&str> = words.normal_order.iter().map(|w| w.word.as_str()).collect();
        learned.retain(|w| known.contains(w.as_str()));

        let total_words = words.total_words();
        let mut session = Self {
            words,
            direction: Direction::Forward,
            pool: Vec::new(),
            current: None,
            revealed: false,
            learned,
            total_words,
            backend,
            rng,
        };
        session.rebuild_pool();
        session.generate_next();
        session
    }

    /// Draw a new word uniformly at random from the pool, or enter
    /// `NoWordsLeft` when the pool is empty.
    pub fn generate_next(&mut self) {
        self.revealed = false;

        if self.pool.is_empty() {
            self.current = None;
            return;
        }

        let index = self.rng.random_range(0..self.pool.len());
        self.current = Some(self.pool[index].clone());
    }

    /// Reveal the answer for the current word. No-op (returns `None`) when
    /// no word is displayed.
    pub fn reveal(&mut self) -> Option<String> {
        let pair = self.current.as_ref()?;
        self.revealed = true;

        let raw = match self.direction {
            Direction::Forward => &pair.translation,
            Direction::Flipped => &pair.word,
        };
        Some(clean_answer(raw))
    }

    /// Mark the current word learned, persist, and draw the next word.
    /// Silently ignored when no word is displayed or it is already learned.
    pub fn mark_learned(&mut self) {
        let Some(pair) = self.current.clone() else {
            tracing::debug!("mark_learned ignored: no current word");
            return;
        };
        if self.learned.contains(&pair.word) {
            return;
        }

        self.learned.insert(pair.word.clone());
        self.persist();
        self.pool.retain(|w| w.word != pair.word);
        self.generate_next();
    }

    /// Forget all progress and start over in the forward direction.
    pub fn reset(&mut self) {
        self.learned.clear();
        if let Err(e) = self.backend.clear() {
            tracing::warn!("failed to clear persisted progress: {e}");
        }
        self.direction = Direction::Forward;
        self.rebuild_pool();
        self.generate_next();
    }

    /// Toggle the ordering. Learned identities key on the prompt side, so a
    /// flip invalidates them: progress is cleared, not carried over.
    pub fn flip_order(&mut self) {
        self.learned.clear();
        if let Err(e) = self.backend.clear() {
            tracing::warn!("failed to clear persisted progress: {e}");
        }
        self.direction = self.direction.toggled();
        self.rebuild_pool();
        self.generate_next();
    }

    /// `(learned_count, total)` for display; total is fixed at load.
    pub fn progress(&self) -> (usize, usize) {
        (self.learned.len(), self.total_words)
    }

    pub fn phase(&self) -> SessionPhase {
        match (&self.current, self.revealed) {
            (None, _) => SessionPhase::NoWordsLeft,
            (Some(_), false) => SessionPhase::WordShown,
            (Some(_), true) => SessionPhase::AnswerShown,
        }
    }

    /// Prompt-side text of the current word.
    pub fn prompt(&self) -> Option<&str> {
        self.current.as_ref().map(|pair| match self.direction {
            Direction::Forward => pair.word.as_str(),
            Direction::Flipped => pair.translation.as_str(),
        })
    }

    pub fn current(&self) -> Option<&WordPair> {
        self.current.as_ref()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn learned(&self) -> &HashSet<String> {
        &self.learned
    }

    fn rebuild_pool(&mut self) {
        self.pool = self
            .words
            .ordering(self.direction)
            .iter()
            .filter(|w| !self.learned.contains(&w.word))
            .cloned()
            .collect();
    }

    fn persist(&self) {
        if let Err(e) = self.backend.save(&self.learned) {
            tracing::warn!("failed to persist learned words: {e}");
        }
    }
}

/// Strip one leading hyphen and any whitespace after it. The source word
/// list prefixes some translations with "- "; this applies to the answer
/// field only and is not a general text rule.
fn clean_answer(raw: &str) -> String {
    match raw.strip_prefix('-') {
        Some(rest) => rest.trim_start().to_string(),
        None => raw.to_string(),
    }
}
