//! JSON-backed record containers.
//!
//! Each moderation concern (tickets, punishments, blacklist, user embeds)
//! owns exactly one container file. A container is either an ordered
//! collection or a keyed mapping; it is rewritten in full on every save.
//!
//! # Features
//!
//! - **Fail-over loading**: an absent or corrupt file yields an empty
//!   container and the file is (re)initialised
//! - **Versioned envelope**: files are written as `{ "version", "records" }`;
//!   bare legacy containers are still accepted on load
//! - **Atomic writes**: temp file + rename
//! - **Serialized mutation**: `update`/`modify`/`try_update` hold a per-store
//!   lock across load-mutate-save
//!
//! # Example
//!
//! ```rust
//! use federal_storage::JsonStore;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dir = std::env::temp_dir().join("federal-doc");
//! let store: JsonStore<Vec<String>> = JsonStore::new(dir.join("names.json"));
//!
//! store.update(|names| names.push("Gustavo".to_string()))?;
//! assert!(store.load().contains(&"Gustavo".to_string()));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod json_store;

pub use federal_error::{StorageError, StorageErrorKind, StorageResult};
pub use json_store::{JsonStore, SCHEMA_VERSION};
