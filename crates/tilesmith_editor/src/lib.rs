//! tilesmith_editor - headless level editor for tile-based games
//!
//! This crate drives a [`tilesmith_core::World`] from pointer input and keeps
//! it persisted:
//! - Key-value stores (in-memory and file-backed) behind [`store::KeyValueStore`]
//! - Debounced saving of the editable form ([`persistence`])
//! - The pointer interaction state machine ([`interaction`])
//! - [`EditorSession`], which owns all of the above and applies edits
//! - Text commands for the `tilesmith session` loop ([`commands`])
//!
//! # Usage
//!
//! ```rust,ignore
//! use tilesmith_core::EditorConfig;
//! use tilesmith_editor::{store::MemoryStore, EditorSession, Tool};
//!
//! let (config, _issues) = EditorConfig::load("tilesmith.toml".as_ref());
//! let mut session = EditorSession::start(&config, MemoryStore::new()).await;
//! session.select_tool(Tool::Pattern("grass".into()));
//! session.pointer_down(4.0, 4.0);
//! session.pointer_up(4.0, 4.0);
//! session.flush().await;
//! ```

pub mod commands;
pub mod interaction;
pub mod persistence;
pub mod session;
pub mod store;

pub use tilesmith_core;

pub use commands::{Command, CommandError, Outcome};
pub use interaction::{DragState, EditAction, Interaction, Tool};
pub use persistence::{PersistenceGateway, SaveDebouncer, SAVE_DEBOUNCE};
pub use session::{EditorSession, SessionError, WorldEvent};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreConfig, StoreError};
