#![allow(dead_code)]

use std::io::Write;
use std::process::{Command, Output, Stdio};

/// Runs the `comment-tree` binary with a snapshot on stdin.
pub struct CliHarness {
    args: Vec<String>,
}

impl CliHarness {
    pub fn new(args: &[&str]) -> Self {
        Self {
            args: args.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn run_with_stdin(&self, input: &str) -> Output {
        let mut child = Command::new(env!("CARGO_BIN_EXE_comment-tree"))
            .args(&self.args)
            .env("RUST_LOG", "off")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("Failed to spawn comment-tree");

        child
            .stdin
            .take()
            .expect("stdin is piped")
            .write_all(input.as_bytes())
            .expect("Failed to write snapshot");

        child.wait_with_output().expect("Failed to wait for comment-tree")
    }

    pub fn run(&self) -> Output {
        self.run_with_stdin("")
    }
}

pub fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "comment-tree failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).expect("stdout is UTF-8")
}

/// The reference thread: A and D at the top, B and C replying to A.
pub const THREAD: &str = r#"{
    "post": { "id": 100, "title": "Launch day", "upvotes": 5, "user": { "username": "op" } },
    "comments": [
        { "id": 1, "content": "A", "upvotes": 10, "user": { "username": "ann" } },
        { "id": 2, "parentId": 1, "content": "B", "upvotes": 5, "user": { "username": "bob" } },
        { "id": 3, "parentId": 1, "content": "C", "upvotes": 1, "downvotes": 2 },
        { "id": 4, "content": "D", "upvotes": 2 }
    ],
    "seq": 7
}"#;
