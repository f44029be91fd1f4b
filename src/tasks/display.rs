//! Console presentation: prints the countdown whenever the view changes

use tokio::sync::watch;
use tracing::info;

use crate::state::DisplayState;

/// Render a view as a single console line
pub fn render_line(view: &DisplayState) -> String {
    let controls: Vec<String> = view
        .status
        .available_commands()
        .iter()
        .map(|command| command.to_string())
        .collect();

    let mut line = format!("[{}] {}  ({})", view.status, view.display(), controls.join("/"));
    if let Some(message) = view.message() {
        line.push_str("  ");
        line.push_str(message);
    }
    line
}

/// Log a line for every distinct view published by the engine
pub async fn display_task(mut views: watch::Receiver<DisplayState>) {
    let mut last_line = String::new();

    loop {
        let line = render_line(&views.borrow_and_update());
        if line != last_line {
            info!("{}", line);
            last_line = line;
        }

        if views.changed().await.is_err() {
            break;
        }
    }
}
