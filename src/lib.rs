//! Session memory and game personalization for agents, served over MCP.
//!
//! Mythiq keeps two kinds of in-process state:
//!
//! | Domain | Unit | What it tracks |
//! |--------|------|----------------|
//! | **Cognition** | Session | Logged request/response entries per conversation |
//! | **Personalization** | Game session | Play-throughs that teach a per-user profile |
//!
//! Session memory supports recall by route, similarity search over request
//! payloads, summaries, a depth/diversity confidence score, and a structural
//! integrity check. Personalization learns genre, difficulty, and play style
//! from finished games, and derives a unique seed per game request whose
//! variance multipliers are shaped by that profile.
//!
//! Stores are plain structs behind a mutex, built once and shared by `Arc`.
//! Misses are data (`None`, `false`, zero scores), not errors.
//!
//! # Modules
//!
//! - [`config`]: configuration loading from TOML files and environment variables
//! - [`error`]: typed failures for caller input and snapshot restore
//! - [`memory`]: cognition sessions and everything that reads them
//! - [`personalization`]: profiles, learning, and per-game seed variance

pub mod config;
pub mod error;
pub mod memory;
pub mod personalization;
