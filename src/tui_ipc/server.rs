//! Snapshot feed: serves the latest snapshot of a file to viewers over a Unix
//! socket.

use std::{fs, path::PathBuf, time::Duration};

use comment_tree::error::Result;
use tokio::{
    io::AsyncWriteExt,
    net::{UnixListener, UnixStream},
    sync::watch,
    time::interval,
};

use super::{
    file_source::SnapshotFile,
    protocol::{socket_path, Message},
};

/// Unix socket server that hands every viewer the latest message.
/// Viewers that fall behind only ever see the newest one.
pub struct SocketServer {
    latest: watch::Sender<Option<Message>>,
}

impl SocketServer {
    pub fn new() -> Self {
        let (latest, _) = watch::channel(None);
        Self { latest }
    }

    /// Bind the socket and start accepting viewers in the background.
    pub fn start_listener(&self) -> Result<()> {
        let path = socket_path();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Remove existing socket file
        if path.exists() {
            let _ = fs::remove_file(&path);
        }

        let listener = UnixListener::bind(&path)?;
        tracing::info!("Listening on {}", path.display());

        let latest = self.latest.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, _)) => {
                        tokio::spawn(handle_client(stream, latest.subscribe()));
                    }
                    Err(e) => {
                        tracing::error!("Accept error: {e}");
                    }
                }
            }
        });
        Ok(())
    }

    /// Replace the message served to viewers.
    pub fn send(&self, msg: Message) {
        self.latest.send_replace(Some(msg));
    }
}

/// Handle a single viewer connection.
async fn handle_client(mut stream: UnixStream, mut latest: watch::Receiver<Option<Message>>) {
    tracing::debug!("Viewer connected");
    if write_message(&mut stream, &Message::Connected).await.is_err() {
        return;
    }
    latest.mark_changed();

    while latest.changed().await.is_ok() {
        let msg = latest.borrow_and_update().clone();
        let Some(msg) = msg else { continue };
        if write_message(&mut stream, &msg).await.is_err() {
            break;
        }
    }
    tracing::debug!("Viewer disconnected");
}

async fn write_message(stream: &mut UnixStream, msg: &Message) -> std::io::Result<()> {
    let json = match serde_json::to_string(msg) {
        Ok(j) => j,
        Err(e) => {
            tracing::warn!("Failed to serialize message: {e}");
            return Ok(());
        }
    };
    stream.write_all(format!("{json}\n").as_bytes()).await
}

/// Serve `path` until the process is stopped, re-publishing it on change.
pub async fn run_feed(path: PathBuf, period: Duration) -> Result<()> {
    let server = SocketServer::new();
    server.start_listener()?;

    let mut file = SnapshotFile::new(path);
    tracing::info!("Feeding snapshots from {}", file.path().display());
    let mut ticker = interval(period);
    loop {
        ticker.tick().await;
        if let Some(msg) = file.poll().await {
            if let Message::Error { error } = &msg {
                tracing::warn!("{error}");
            }
            server.send(msg);
        }
    }
}
