//! tilesmith - headless tile-map level editor
//!
//! ```text
//! tilesmith [--config tilesmith.toml] [--store DIR] <export|export-game|import FILE|clear|session>
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tilesmith_core::EditorConfig;
use tilesmith_editor::commands::{self, Command, Outcome};
use tilesmith_editor::{EditorSession, FileStore, SessionError, StoreConfig, StoreError};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Headless tile-map level editor
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Startup configuration (TOML)
    #[arg(long, short, value_name = "PATH", default_value = "tilesmith.toml")]
    config: PathBuf,

    /// Store root directory (default: the platform data directory)
    #[arg(long, value_name = "DIR")]
    store: Option<PathBuf>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Write the editable form of the stored world
    Export {
        /// Output file (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Write the runtime form consumed by games
    ExportGame {
        /// Output file (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Replace the stored world with an editable-form file
    Import { file: PathBuf },
    /// Delete everything in the store
    Clear,
    /// Read pointer and tool commands from stdin, one per line
    Session,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tilesmith=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), SessionError> {
    // Config problems are logged by the loader and fall back to defaults
    let (config, _issues) = EditorConfig::load(&cli.config);

    let root = cli
        .store
        .or_else(FileStore::default_root)
        .ok_or_else(|| StoreError::Unavailable("no data directory for this platform".into()))?;
    let store = FileStore::open(&root, &StoreConfig::default()).await?;
    info!("Using store at {}", store.dir().display());

    let mut session = EditorSession::start(&config, store).await;
    match cli.action {
        Action::Export { output } => write_output(output.as_deref(), &session.export_editable()?).await,
        Action::ExportGame { output } => {
            write_output(output.as_deref(), &session.export_runtime()?).await
        }
        Action::Import { file } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .map_err(|source| SessionError::Io {
                    path: file.clone(),
                    source,
                })?;
            session.import(&text)?;
            session.flush().await;
            info!("Imported {}", file.display());
            Ok(())
        }
        Action::Clear => session.clear_store().await,
        Action::Session => run_session(&mut session).await,
    }
}

async fn write_output(path: Option<&Path>, text: &str) -> Result<(), SessionError> {
    match path {
        Some(path) => tokio::fs::write(path, text)
            .await
            .map_err(|source| SessionError::Io {
                path: path.to_path_buf(),
                source,
            }),
        None => print(text).await,
    }
}

async fn print(text: &str) -> Result<(), SessionError> {
    let mut stdout = tokio::io::stdout();
    let io = |source| SessionError::Io {
        path: PathBuf::from("<stdout>"),
        source,
    };
    stdout.write_all(text.as_bytes()).await.map_err(io)?;
    if !text.ends_with('\n') {
        stdout.write_all(b"\n").await.map_err(io)?;
    }
    stdout.flush().await.map_err(io)
}

/// Interleave stdin commands with the debounced save
async fn run_session(session: &mut EditorSession<FileStore>) -> Result<(), SessionError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!("Session ready, type 'help' for commands");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = line.map_err(|source| SessionError::Io {
                    path: PathBuf::from("<stdin>"),
                    source,
                })?;
                let Some(line) = line else { break };
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let command = match line.parse::<Command>() {
                    Ok(command) => command,
                    Err(e) => {
                        warn!("{}", e);
                        continue;
                    }
                };
                match commands::execute(session, command).await {
                    Ok(Outcome::Continue) => {}
                    Ok(Outcome::Output(text)) => print(&text).await?,
                    Ok(Outcome::Quit) => break,
                    Err(e) => warn!("{}", e),
                }
            }
            _ = session.persistence().wait_until_due() => {
                session.save_if_due().await;
            }
        }
    }

    session.flush().await;
    Ok(())
}
