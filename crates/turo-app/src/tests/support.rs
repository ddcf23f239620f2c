use std::sync::Arc;
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::Notify;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use turo_config::Config;
use turo_core::{MemoryBackend, Session};
use turo_explain::{ExplainError, Explainer};
use turo_types::{AppEvent, WordList, WordPair};

use crate::events::event_loop;
use crate::state::AppState;

/// Scripted explainer: waits for the gate, then either fails or streams
/// its chunks in order.
pub struct StubExplainer {
    pub chunks: Vec<&'static str>,
    pub gate: Arc<Notify>,
    pub fail: bool,
}

#[async_trait::async_trait]
impl Explainer for StubExplainer {
    async fn explain(
        &self,
        _word: &str,
        _translation: &str,
        chunks: AsyncSender<String>,
    ) -> Result<String, ExplainError> {
        self.gate.notified().await;

        if self.fail {
            return Err(ExplainError::ApiError("HTTP 503".to_string()));
        }

        let mut text = String::new();
        for chunk in &self.chunks {
            text.push_str(chunk);
            let _ = chunks.send(chunk.to_string()).await;
        }
        Ok(text.trim().to_string())
    }
}

pub fn pair(word: &str, translation: &str) -> WordPair {
    WordPair {
        word: word.to_string(),
        translation: translation.to_string(),
    }
}

/// Spawn an event loop over an in-memory session with a seeded RNG.
pub fn spawn_loop(
    words: WordList,
    explainer: Arc<dyn Explainer>,
) -> (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>) {
    let (ui_to_app_tx, ui_to_app_rx) = kanal::bounded_async(64);
    let (app_to_ui_tx, app_to_ui_rx) = kanal::bounded_async(256);

    let state = Arc::new(AppState::new(Config::new()));
    let session = Session::new(
        words,
        Box::new(MemoryBackend::new()),
        StdRng::seed_from_u64(9),
    );

    tokio::spawn(event_loop(
        state,
        session,
        explainer,
        ui_to_app_rx,
        app_to_ui_tx,
        ui_to_app_tx.clone(),
        CancellationToken::new(),
    ));

    (ui_to_app_tx, app_to_ui_rx)
}

pub async fn recv_event(rx: &AsyncReceiver<AppEvent>) -> AppEvent {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

pub async fn assert_silent(rx: &AsyncReceiver<AppEvent>) {
    let result = timeout(Duration::from_millis(300), rx.recv()).await;
    assert!(result.is_err(), "expected no event, got {:?}", result);
}
