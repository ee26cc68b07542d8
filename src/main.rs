mod tui;
mod tui_ipc;

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clap::{Parser, Subcommand};
use comment_tree::{
    config::load_layout_config,
    error::Result,
    model::Snapshot,
    outline::render_outline,
    tree::{CommentTree, LayoutConfig},
};
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "comment-tree")]
#[command(about = "Build, rank and draw the comment tree of a discussion post")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the annotated tree of a snapshot as JSON
    Render {
        /// Snapshot file (reads stdin when omitted)
        file: Option<PathBuf>,
        /// Layout configuration file
        #[arg(long)]
        layout: Option<PathBuf>,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Print an indented text outline of a snapshot
    Outline {
        /// Snapshot file (reads stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Run the interactive viewer (watches FILE, or connects to a feed)
    View {
        /// Snapshot file to watch
        file: Option<PathBuf>,
        /// Layout configuration file
        #[arg(long)]
        layout: Option<PathBuf>,
    },
    /// Serve snapshots of FILE to viewers whenever it changes
    Feed {
        file: PathBuf,
        /// How often to check the file for changes
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(matches!(cli.command, Commands::View { .. }));

    let result = match cli.command {
        Commands::Render {
            file,
            layout,
            pretty,
        } => render(file.as_deref(), layout.as_deref(), pretty).await,
        Commands::Outline { file } => outline(file.as_deref()).await,
        Commands::View { file, layout } => view(file, layout.as_deref()).await,
        Commands::Feed { file, interval_ms } => {
            tui_ipc::run_feed(file, Duration::from_millis(interval_ms)).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// The viewer owns the terminal, so it logs to a file; everything else logs
/// to stderr.
fn init_tracing(to_file: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("comment_tree=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if to_file {
        let log_file = dirs::cache_dir()
            .map(|dir| dir.join("comment-tree"))
            .and_then(|dir| {
                std::fs::create_dir_all(&dir).ok()?;
                std::fs::File::create(dir.join("comment-tree.log")).ok()
            });
        if let Some(log_file) = log_file {
            builder.with_writer(log_file).with_ansi(false).init();
        }
        return;
    }
    builder.with_writer(std::io::stderr).init();
}

async fn read_snapshot(file: Option<&Path>) -> Result<Snapshot> {
    let text = match file {
        Some(path) => tokio::fs::read_to_string(path).await?,
        None => {
            let mut text = String::new();
            tokio::io::stdin().read_to_string(&mut text).await?;
            text
        }
    };
    Ok(Snapshot::from_json(&text)?)
}

async fn render(file: Option<&Path>, layout: Option<&Path>, pretty: bool) -> Result<()> {
    let config = load_layout_config(layout)?;
    let tree = CommentTree::from_snapshot(read_snapshot(file).await?, &config);
    let json = if pretty {
        serde_json::to_string_pretty(&tree.root)?
    } else {
        serde_json::to_string(&tree.root)?
    };
    println!("{json}");
    Ok(())
}

async fn outline(file: Option<&Path>) -> Result<()> {
    let tree = CommentTree::from_snapshot(read_snapshot(file).await?, &LayoutConfig::default());
    print!("{}", render_outline(&tree));
    Ok(())
}

async fn view(file: Option<PathBuf>, layout: Option<&Path>) -> Result<()> {
    let config = load_layout_config(layout)?;
    let source = match file {
        Some(path) => tui::Source::File {
            path,
            period: Duration::from_millis(250),
        },
        None => tui::Source::Socket,
    };
    tui::run(source, config).await
}
