use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::timeout;
use turo_types::{AppEvent, Direction, WordList};

use super::support::{StubExplainer, assert_silent, pair, recv_event, spawn_loop};

fn idle_stub() -> Arc<StubExplainer> {
    Arc::new(StubExplainer {
        chunks: vec![],
        gate: Arc::new(Notify::new()),
        fail: false,
    })
}

fn one_word() -> WordList {
    WordList {
        normal_order: vec![pair("aso", "- dog")],
        flipped_order: vec![pair("dog", "aso")],
    }
}

#[tokio::test]
async fn startup_announces_progress_and_first_word() {
    let (_tx, rx) = spawn_loop(one_word(), idle_stub());

    assert!(matches!(
        recv_event(&rx).await,
        AppEvent::ProgressChanged { learned: 0, total: 1 }
    ));
    assert!(matches!(
        recv_event(&rx).await,
        AppEvent::ShowWord { prompt } if prompt == "aso"
    ));
}

#[tokio::test]
async fn reveal_sends_the_cleaned_answer() {
    let (tx, rx) = spawn_loop(one_word(), idle_stub());
    recv_event(&rx).await;
    recv_event(&rx).await;

    tx.send(AppEvent::Reveal).await.unwrap();
    // Leading "- " of the stored translation is stripped.
    assert!(matches!(
        recv_event(&rx).await,
        AppEvent::ShowAnswer { answer } if answer == "dog"
    ));
}

#[tokio::test]
async fn marking_the_last_word_exhausts_the_pool() {
    let (tx, rx) = spawn_loop(one_word(), idle_stub());
    recv_event(&rx).await;
    recv_event(&rx).await;

    tx.send(AppEvent::MarkLearned).await.unwrap();
    assert!(matches!(
        recv_event(&rx).await,
        AppEvent::ProgressChanged { learned: 1, total: 1 }
    ));
    assert!(matches!(recv_event(&rx).await, AppEvent::AllWordsLearned));

    // Reveal with no current word is silently ignored.
    tx.send(AppEvent::Reveal).await.unwrap();
    assert_silent(&rx).await;
}

#[tokio::test]
async fn flip_clears_progress_and_swaps_sides() {
    let (tx, rx) = spawn_loop(one_word(), idle_stub());
    recv_event(&rx).await;
    recv_event(&rx).await;

    tx.send(AppEvent::MarkLearned).await.unwrap();
    recv_event(&rx).await; // progress 1/1
    recv_event(&rx).await; // all words learned

    tx.send(AppEvent::FlipOrder).await.unwrap();
    assert!(matches!(
        recv_event(&rx).await,
        AppEvent::DirectionChanged { direction: Direction::Flipped }
    ));
    assert!(matches!(
        recv_event(&rx).await,
        AppEvent::ProgressChanged { learned: 0, total: 1 }
    ));
    // Flipped pair is ("dog", "aso"); the prompt shows the translation side.
    assert!(matches!(
        recv_event(&rx).await,
        AppEvent::ShowWord { prompt } if prompt == "aso"
    ));

    tx.send(AppEvent::Reveal).await.unwrap();
    assert!(matches!(
        recv_event(&rx).await,
        AppEvent::ShowAnswer { answer } if answer == "dog"
    ));
}

#[tokio::test]
async fn reset_returns_to_forward_order() {
    let (tx, rx) = spawn_loop(one_word(), idle_stub());
    recv_event(&rx).await;
    recv_event(&rx).await;

    tx.send(AppEvent::FlipOrder).await.unwrap();
    recv_event(&rx).await;
    recv_event(&rx).await;
    recv_event(&rx).await;

    tx.send(AppEvent::Reset).await.unwrap();
    assert!(matches!(
        recv_event(&rx).await,
        AppEvent::DirectionChanged { direction: Direction::Forward }
    ));
    assert!(matches!(
        recv_event(&rx).await,
        AppEvent::ProgressChanged { learned: 0, total: 1 }
    ));
    assert!(matches!(
        recv_event(&rx).await,
        AppEvent::ShowWord { prompt } if prompt == "aso"
    ));
}

#[tokio::test]
async fn quit_stops_the_event_loop() {
    let (tx, rx) = spawn_loop(one_word(), idle_stub());
    recv_event(&rx).await;
    recv_event(&rx).await;

    tx.send(AppEvent::Quit).await.unwrap();

    // The loop drops its sender on exit, closing the display channel.
    let closed = timeout(Duration::from_secs(2), rx.recv()).await;
    assert!(matches!(closed, Ok(Err(_))));
}
