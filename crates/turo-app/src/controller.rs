use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use rand::Rng;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use turo_core::Session;
use turo_explain::Explainer;
use turo_types::AppEvent;

use crate::events::event_loop;
use crate::state::AppState;
use crate::ui::ui_loop;

/// Centralized channel management
pub struct ChannelSet {
    pub app_to_ui: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    pub ui_to_app: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            app_to_ui: kanal::bounded_async(256), // streamed explanation bursts
            ui_to_app: kanal::bounded_async(64),  // UI interactions
        }
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            channels: ChannelSet::new(),
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn spawn_tasks<R>(
        &self,
        session: Session<R>,
        explainer: Arc<dyn Explainer>,
    ) -> JoinSet<anyhow::Result<()>>
    where
        R: Rng + Send + Sync + 'static,
    {
        let mut tasks = JoinSet::new();

        // Event loop; the ui_to_app sender doubles as the loopback for
        // explanation tasks reporting their chunks.
        tasks.spawn(event_loop(
            self.state.clone(),
            session,
            explainer,
            self.channels.ui_to_app.1.clone(),
            self.channels.app_to_ui.0.clone(),
            self.channels.ui_to_app.0.clone(),
            self.cancel_token.child_token(),
        ));

        // UI loop
        tasks.spawn(ui_loop(
            self.channels.app_to_ui.1.clone(),
            self.channels.ui_to_app.0.clone(),
        ));

        tasks
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
