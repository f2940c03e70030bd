//! Cognition-domain session memory.
//!
//! Sessions live in a [`sessions::SessionStore`]. Handlers append through
//! [`entries::log_entry`]; recall, summaries, feedback scoring, integrity
//! checks, and statistics read through the [`types::SessionReader`] interface.

pub mod entries;
pub mod feedback;
pub mod integrity;
pub mod recall;
pub mod sessions;
pub mod stats;
pub mod summary;
pub mod types;

pub use sessions::SessionStore;
pub use types::{Entry, SessionReader, SessionRecord, SessionWriter};
