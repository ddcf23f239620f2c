use std::io::{self, Write};

use kanal::{AsyncReceiver, AsyncSender};
use tokio::io::{AsyncBufReadExt, BufReader};
use turo_types::{AppEvent, Direction};

/// The three actions the focus cursor cycles over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MainAction {
    Generate,
    Reveal,
    MarkLearned,
}

const MAIN_ACTIONS: [MainAction; 3] = [
    MainAction::Generate,
    MainAction::Reveal,
    MainAction::MarkLearned,
];

impl MainAction {
    fn label(self) -> &'static str {
        match self {
            MainAction::Generate => "generate next word",
            MainAction::Reveal => "show answer",
            MainAction::MarkLearned => "mark as learned",
        }
    }

    fn event(self) -> AppEvent {
        match self {
            MainAction::Generate => AppEvent::Generate,
            MainAction::Reveal => AppEvent::Reveal,
            MainAction::MarkLearned => AppEvent::MarkLearned,
        }
    }
}

/// Line-oriented UI loop over stdin/stdout
pub async fn ui_loop(
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    ui_to_app_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    print_help();

    let mut focus: usize = 0;
    let mut stream: Option<String> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            event = app_to_ui_rx.recv() => {
                render(event?, &mut stream)?;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // stdin closed
                    let _ = ui_to_app_tx.send(AppEvent::Quit).await;
                    break;
                };
                if !handle_command(line.trim(), &mut focus, &ui_to_app_tx).await? {
                    let _ = ui_to_app_tx.send(AppEvent::Quit).await;
                    break;
                }
            }
        }
    }

    Ok(())
}

fn render(event: AppEvent, stream: &mut Option<String>) -> anyhow::Result<()> {
    match event {
        AppEvent::ShowWord { prompt } => {
            discard_stream(stream);
            println!();
            println!("  {prompt}");
        }
        AppEvent::ShowAnswer { answer } => {
            println!("  = {answer}");
        }
        AppEvent::AllWordsLearned => {
            discard_stream(stream);
            println!();
            println!("All words learned!");
        }
        AppEvent::ProgressChanged { learned, total } => {
            println!("{learned} / {total} words learned");
        }
        AppEvent::DirectionChanged { direction } => match direction {
            Direction::Forward => println!("Normal order"),
            Direction::Flipped => println!("Flipped order"),
        },
        AppEvent::ExplanationChunk { text, .. } => {
            stream.get_or_insert_with(String::new).push_str(&text);
            print!("{text}");
            io::stdout().flush()?;
        }
        AppEvent::ExplanationDone { text, .. } => {
            let streamed = stream.take();
            if streamed.is_some() {
                println!();
            }
            if let Some(line) = completion_line(streamed, text) {
                println!("{line}");
            }
        }
        AppEvent::ExplanationFailed { .. } => {
            discard_stream(stream);
            println!("Failed to load explanation. Please try again.");
        }
        AppEvent::ExplanationUnavailable => {
            println!("Explanations are disabled.");
        }
        // App-bound events never reach the UI loop.
        _ => {}
    }
    Ok(())
}

/// The completion carries the cleaned text, with the model's stop token
/// stripped. When the streamed fragments do not already spell it out,
/// return it so the final line on screen is the cleaned version.
fn completion_line(streamed: Option<String>, cleaned: String) -> Option<String> {
    match streamed {
        Some(buffer) if buffer.trim() == cleaned => None,
        _ => Some(cleaned),
    }
}

fn discard_stream(stream: &mut Option<String>) {
    if stream.take().is_some() {
        println!();
    }
}

/// Returns false when the user asked to quit.
async fn handle_command(
    command: &str,
    focus: &mut usize,
    tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<bool> {
    match command {
        "" => tx.send(MAIN_ACTIONS[*focus].event()).await?,
        "g" | "generate" => tx.send(AppEvent::Generate).await?,
        "a" | "answer" => tx.send(AppEvent::Reveal).await?,
        "l" | "learned" => tx.send(AppEvent::MarkLearned).await?,
        "r" | "reset" => tx.send(AppEvent::Reset).await?,
        "f" | "flip" => tx.send(AppEvent::FlipOrder).await?,
        "e" | "explain" => tx.send(AppEvent::RequestExplanation).await?,
        "k" | "up" => move_focus(focus, -1),
        "j" | "down" => move_focus(focus, 1),
        "h" | "help" | "?" => print_help(),
        "q" | "quit" | "exit" => return Ok(false),
        other => println!("unknown command: {other} (h for help)"),
    }
    Ok(true)
}

fn move_focus(focus: &mut usize, step: isize) {
    let len = MAIN_ACTIONS.len() as isize;
    *focus = (*focus as isize + step).rem_euclid(len) as usize;
    println!("[{}]", MAIN_ACTIONS[*focus].label());
}

fn print_help() {
    println!("turo — flashcard trainer");
    println!("  enter      run the focused action");
    println!("  k/up j/down  move focus ({})", focus_labels());
    println!("  g  generate next word");
    println!("  a  show answer");
    println!("  l  mark word as learned");
    println!("  e  explain current word");
    println!("  f  flip word order (clears progress)");
    println!("  r  reset progress");
    println!("  q  quit");
}

fn focus_labels() -> String {
    MAIN_ACTIONS
        .iter()
        .map(|a| a.label())
        .collect::<Vec<_>>()
        .join(" / ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_wraps_in_both_directions() {
        let mut focus = 0;
        move_focus(&mut focus, -1);
        assert_eq!(focus, MAIN_ACTIONS.len() - 1);
        move_focus(&mut focus, 1);
        assert_eq!(focus, 0);

        for _ in 0..MAIN_ACTIONS.len() {
            move_focus(&mut focus, 1);
        }
        assert_eq!(focus, 0);
    }

    #[test]
    fn completion_matching_the_stream_is_not_reprinted() {
        let line = completion_line(Some("Aso means dog.".into()), "Aso means dog.".into());
        assert_eq!(line, None);
    }

    #[test]
    fn completion_with_stripped_stop_token_is_reprinted() {
        let line = completion_line(Some("Aso means dog.</s>".into()), "Aso means dog.".into());
        assert_eq!(line.as_deref(), Some("Aso means dog."));
    }

    #[test]
    fn completion_without_a_stream_is_printed() {
        let line = completion_line(None, "Aso means dog.".into());
        assert_eq!(line.as_deref(), Some("Aso means dog."));
    }

    #[test]
    fn focused_actions_map_to_their_events() {
        assert!(matches!(MainAction::Generate.event(), AppEvent::Generate));
        assert!(matches!(MainAction::Reveal.event(), AppEvent::Reveal));
        assert!(matches!(
            MainAction::MarkLearned.event(),
            AppEvent::MarkLearned
        ));
    }
}
