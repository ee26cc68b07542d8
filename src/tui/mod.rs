//! Interactive terminal viewer for a comment tree.

pub mod app;
mod canvas;
mod theme;
mod ui;

use std::{io::stdout, path::PathBuf, time::Duration};

use app::App;
use comment_tree::{error::Result, tree::LayoutConfig};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, EventStream},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use futures::StreamExt;
use ratatui::prelude::*;
use tokio::{sync::mpsc, time::sleep};

use crate::tui_ipc::{socket_path, spawn_file_watcher, spawn_socket_handler, Message};

/// Where snapshots come from.
pub enum Source {
    /// A JSON file, re-read whenever it changes.
    File { path: PathBuf, period: Duration },
    /// A `feed` process serving snapshots over the Unix socket.
    Socket,
}

impl Source {
    fn describe(&self) -> String {
        match self {
            Self::File { path, .. } => path.display().to_string(),
            Self::Socket => socket_path().display().to_string(),
        }
    }

    fn spawn(self) -> mpsc::Receiver<Message> {
        match self {
            Self::File { path, period } => spawn_file_watcher(path, period),
            Self::Socket => spawn_socket_handler(),
        }
    }
}

pub async fn run(source: Source, config: LayoutConfig) -> Result<()> {
    let mut app = App::new(config, source.describe());
    let mut rx = source.spawn();

    enable_raw_mode()?;
    stdout()
        .execute(EnterAlternateScreen)?
        .execute(EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut event_stream = EventStream::new();

    while !app.should_exit {
        terminal.draw(|frame| ui::render(frame, &mut app))?;

        tokio::select! {
            Some(msg) = rx.recv() => {
                // Drain whatever else arrived so a burst is rebuilt once.
                let mut burst = vec![msg];
                while let Ok(more) = rx.try_recv() {
                    burst.push(more);
                }
                app.handle_messages(burst);
            }
            Some(Ok(event)) = event_stream.next() => {
                app.handle_event(&event);
            }
            () = sleep(Duration::from_millis(250)) => {}
        }
    }

    disable_raw_mode()?;
    stdout()
        .execute(DisableMouseCapture)?
        .execute(LeaveAlternateScreen)?;

    Ok(())
}
