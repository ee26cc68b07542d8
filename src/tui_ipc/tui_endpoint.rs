use std::time::Duration;

use tokio::{
    io::{AsyncBufReadExt, BufReader},
    net::UnixStream,
    sync::mpsc,
    time::sleep,
};

use super::protocol::{socket_path, Message};

/// Spawn a background task that connects to the feed socket.
/// Returns a receiver for incoming messages.
pub fn spawn_socket_handler() -> mpsc::Receiver<Message> {
    let (msg_tx, msg_rx) = mpsc::channel::<Message>(16);
    tokio::spawn(connection_loop(msg_tx));
    msg_rx
}

async fn connection_loop(msg_tx: mpsc::Sender<Message>) {
    let path = socket_path();
    loop {
        match UnixStream::connect(&path).await {
            Ok(stream) => {
                if handle_connection(stream, &msg_tx).await.is_err() {
                    return; // viewer closed, exit task
                }
            }
            Err(_) => {
                // Retry connection after delay
                sleep(Duration::from_secs(1)).await;
            }
        }
    }
}

async fn handle_connection(stream: UnixStream, msg_tx: &mpsc::Sender<Message>) -> Result<(), ()> {
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match serde_json::from_str::<Message>(&line) {
            Ok(msg) => msg_tx.send(msg).await.map_err(|_| ())?,
            Err(e) => tracing::warn!("Ignoring malformed feed line: {e}"),
        }
    }
    tracing::debug!("Feed connection closed, reconnecting");
    Ok(())
}
