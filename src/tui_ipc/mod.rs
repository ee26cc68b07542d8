//! Inter-process plumbing between snapshot producers and the viewer.
//!
//! This module provides:
//! - `protocol`: message types, serialized one JSON object per line
//! - `file_source`: snapshot files polled for changes
//! - `server`: the `feed` side, serving the latest snapshot over a Unix socket
//! - `tui_endpoint`: the viewer side of that socket

mod file_source;
mod protocol;
mod server;
mod tui_endpoint;

pub use file_source::spawn_file_watcher;
pub use protocol::{socket_path, Message};
pub use server::run_feed;
pub use tui_endpoint::spawn_socket_handler;
