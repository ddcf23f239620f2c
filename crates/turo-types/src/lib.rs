use serde::{Deserialize, Serialize};

/// One entry of the word list. Identity is the `word` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPair {
    pub word: String,
    pub translation: String,
}

/// The two parallel orderings of the word file. Loaded once, read-only after.
#[derive(Debug, Clone)]
pub struct WordList {
    pub normal_order: Vec<WordPair>,
    pub flipped_order: Vec<WordPair>,
}

impl WordList {
    pub fn ordering(&self, direction: Direction) -> &[WordPair] {
        match direction {
            Direction::Forward => &self.normal_order,
            Direction::Flipped => &self.flipped_order,
        }
    }

    /// Fixed at load time, independent of direction.
    pub fn total_words(&self) -> usize {
        self.normal_order.len()
    }
}

/// Which field of a pair is shown as the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Flipped,
}

impl Direction {
    pub fn toggled(self) -> Self {
        match self {
            Direction::Forward => Direction::Flipped,
            Direction::Flipped => Direction::Forward,
        }
    }
}

/// Observable phase of a flashcard session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NoWordsLeft,
    WordShown,
    AnswerShown,
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    // UI -> app
    Generate,
    Reveal,
    MarkLearned,
    Reset,
    FlipOrder,
    RequestExplanation,
    Quit,

    // app -> UI
    ShowWord { prompt: String },
    ShowAnswer { answer: String },
    AllWordsLearned,
    ProgressChanged { learned: usize, total: usize },
    DirectionChanged { direction: Direction },
    ExplanationChunk { word: String, text: String },
    ExplanationDone { word: String, text: String },
    ExplanationFailed { word: String },
    ExplanationUnavailable,
}
