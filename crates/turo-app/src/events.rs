use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use rand::Rng;
use tokio_util::sync::CancellationToken;
use turo_core::Session;
use turo_explain::Explainer;
use turo_types::{AppEvent, WordPair};

use crate::state::AppState;

/// Identity tag and cancel handle of the in-flight explanation stream
pub struct ExplainTask {
    pub(crate) word: String,
    pub(crate) token: CancellationToken,
}

/// App's main loop: owns the session, applies every user action, and
/// gatekeeps explanation output against the currently displayed word.
pub async fn event_loop<R>(
    state: Arc<AppState>,
    mut session: Session<R>,
    explainer: Arc<dyn Explainer>,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    app_to_ui_tx: AsyncSender<AppEvent>,
    loopback_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()>
where
    R: Rng + Send + Sync + 'static,
{
    let inference_enabled = {
        let config = state.config.read().await;
        config.inference.enabled
    };

    // Announce the initial state computed at startup.
    push_card(&session, &app_to_ui_tx).await?;

    let mut explain: Option<ExplainTask> = None;

    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = ui_to_app_rx.recv() => event?,
        };

        match event {
            AppEvent::Generate => {
                supersede(&mut explain);
                session.generate_next();
                push_card(&session, &app_to_ui_tx).await?;
            }
            AppEvent::Reveal => match session.reveal() {
                Some(answer) => app_to_ui_tx.send(AppEvent::ShowAnswer { answer }).await?,
                None => tracing::debug!("reveal ignored: no current word"),
            },
            AppEvent::MarkLearned => {
                supersede(&mut explain);
                session.mark_learned();
                push_card(&session, &app_to_ui_tx).await?;
            }
            AppEvent::Reset => {
                supersede(&mut explain);
                session.reset();
                app_to_ui_tx
                    .send(AppEvent::DirectionChanged {
                        direction: session.direction(),
                    })
                    .await?;
                push_card(&session, &app_to_ui_tx).await?;
            }
            AppEvent::FlipOrder => {
                supersede(&mut explain);
                session.flip_order();
                app_to_ui_tx
                    .send(AppEvent::DirectionChanged {
                        direction: session.direction(),
                    })
                    .await?;
                push_card(&session, &app_to_ui_tx).await?;
            }
            AppEvent::RequestExplanation => {
                let Some(pair) = session.current().cloned() else {
                    tracing::debug!("explanation ignored: no current word");
                    continue;
                };
                if !inference_enabled {
                    app_to_ui_tx.send(AppEvent::ExplanationUnavailable).await?;
                } else if explain.as_ref().is_some_and(|t| t.word == pair.word) {
                    // At most one request in flight per displayed word.
                    tracing::debug!("explanation for '{}' already in flight", pair.word);
                } else {
                    supersede(&mut explain);
                    explain = Some(spawn_explanation(
                        &pair,
                        explainer.clone(),
                        loopback_tx.clone(),
                        &cancel,
                    ));
                }
            }
            AppEvent::ExplanationChunk { word, text } => {
                if explanation_is_live(explain.as_ref(), session.current(), &word) {
                    app_to_ui_tx
                        .send(AppEvent::ExplanationChunk { word, text })
                        .await?;
                } else {
                    tracing::debug!("dropping stale explanation chunk for '{word}'");
                }
            }
            AppEvent::ExplanationDone { word, text } => {
                if explanation_is_live(explain.as_ref(), session.current(), &word) {
                    explain = None;
                    app_to_ui_tx
                        .send(AppEvent::ExplanationDone { word, text })
                        .await?;
                } else {
                    tracing::debug!("dropping stale explanation result for '{word}'");
                }
            }
            AppEvent::ExplanationFailed { word } => {
                if explanation_is_live(explain.as_ref(), session.current(), &word) {
                    explain = None;
                    app_to_ui_tx
                        .send(AppEvent::ExplanationFailed { word })
                        .await?;
                }
            }
            AppEvent::Quit => {
                supersede(&mut explain);
                break;
            }
            // Display events never reach the app loop.
            _ => {}
        }
    }

    Ok(())
}

/// A chunk is live only while its tag matches both the in-flight request
/// and the currently displayed word.
pub(crate) fn explanation_is_live(
    task: Option<&ExplainTask>,
    current: Option<&WordPair>,
    word: &str,
) -> bool {
    task.is_some_and(|t| t.word == word) && current.is_some_and(|c| c.word == word)
}

fn supersede(task: &mut Option<ExplainTask>) {
    if let Some(task) = task.take() {
        task.token.cancel();
    }
}

async fn push_card<R: Rng>(
    session: &Session<R>,
    tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let (learned, total) = session.progress();
    tx.send(AppEvent::ProgressChanged { learned, total }).await?;

    match session.prompt() {
        Some(prompt) => {
            tx.send(AppEvent::ShowWord {
                prompt: prompt.to_string(),
            })
            .await?
        }
        None => tx.send(AppEvent::AllWordsLearned).await?,
    }
    Ok(())
}

/// Start a streamed explanation request for `pair`, tagged with the word
/// identity active right now. Output flows back through `loopback_tx` so
/// the event loop can drop it once the word moves on.
fn spawn_explanation(
    pair: &WordPair,
    explainer: Arc<dyn Explainer>,
    loopback_tx: AsyncSender<AppEvent>,
    parent: &CancellationToken,
) -> ExplainTask {
    let token = parent.child_token();
    let (chunk_tx, chunk_rx) = kanal::bounded_async::<String>(64);

    let word = pair.word.clone();
    let translation = pair.translation.clone();

    // Forward fragments as they are decoded.
    let forwarder = {
        let tx = loopback_tx.clone();
        let word = word.clone();
        let token = token.clone();
        tokio::spawn(async move {
            loop {
                let chunk = tokio::select! {
                    _ = token.cancelled() => break,
                    chunk = chunk_rx.recv() => chunk,
                };
                let Ok(text) = chunk else { break };
                let event = AppEvent::ExplanationChunk {
                    word: word.clone(),
                    text,
                };
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        })
    };

    // Run the request itself; cancellation closes the stream early.
    {
        let tx = loopback_tx;
        let word = word.clone();
        let token = token.clone();
        tokio::spawn(async move {
            let request = {
                let word = word.clone();
                async move { explainer.explain(&word, &translation, chunk_tx).await }
            };

            let result = tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!("explanation for '{word}' superseded, closing stream");
                    return;
                }
                result = request => result,
            };

            // The request owned the chunk sender, so the forwarder drains and
            // exits here; completion must not overtake the last fragments.
            let _ = forwarder.await;

            let event = match result {
                Ok(text) => AppEvent::ExplanationDone {
                    word: word.clone(),
                    text,
                },
                Err(e) => {
                    tracing::error!("explanation stream failed: {e}");
                    AppEvent::ExplanationFailed { word: word.clone() }
                }
            };
            let _ = tx.send(event).await;
        });
    }

    ExplainTask { word, token }
}
