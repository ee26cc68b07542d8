//! Snapshot files watched by modification time.

use std::{
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use comment_tree::model::Snapshot;
use tokio::{fs, sync::mpsc, time::interval};

use super::protocol::Message;

/// Re-reads a snapshot file whenever its modification time changes and
/// stamps each read with the next sequence number.
pub struct SnapshotFile {
    path: PathBuf,
    last_modified: Option<SystemTime>,
    seq: u64,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_modified: None,
            seq: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check the file once. Returns a message if it changed since the last
    /// check (or on the first check).
    pub async fn poll(&mut self) -> Option<Message> {
        let modified = match fs::metadata(&self.path).await.and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                if self.last_modified.take().is_some() || self.seq == 0 {
                    self.seq += 1;
                    return Some(Message::Error {
                        error: format!("Cannot read {}: {e}", self.path.display()),
                    });
                }
                return None;
            }
        };
        if self.last_modified == Some(modified) {
            return None;
        }
        self.last_modified = Some(modified);
        self.seq += 1;

        let message = match fs::read_to_string(&self.path).await {
            Ok(text) => match Snapshot::from_json(&text) {
                Ok(mut snapshot) => {
                    snapshot.seq = Some(self.seq);
                    Message::Snapshot(snapshot)
                }
                Err(e) => Message::Error {
                    error: format!("Invalid snapshot in {}: {e}", self.path.display()),
                },
            },
            Err(e) => Message::Error {
                error: format!("Cannot read {}: {e}", self.path.display()),
            },
        };
        tracing::debug!(seq = self.seq, path = %self.path.display(), "Snapshot file changed");
        Some(message)
    }
}

/// Spawn a background task that polls a snapshot file and forwards changes.
pub fn spawn_file_watcher(path: PathBuf, period: Duration) -> mpsc::Receiver<Message> {
    let (tx, rx) = mpsc::channel::<Message>(16);

    tokio::spawn(async move {
        let mut file = SnapshotFile::new(path);
        let mut ticker = interval(period);
        loop {
            ticker.tick().await;
            if let Some(msg) = file.poll().await {
                if tx.send(msg).await.is_err() {
                    return; // viewer closed
                }
            }
        }
    });

    rx
}
