//! Remote MCP gateway for Obsidian-style note vaults.
//!
//! Vaultgate sits between tool-calling AI agents and a local note-plugin
//! REST API: agents speak JSON-RPC 2.0 over a single HTTP endpoint and get
//! a fixed catalogue of vault tools (note CRUD, search, traversal) plus a
//! URI-addressable resource view, while the gateway handles caching,
//! batched discovery, template-aware writes, and event-stream responses.
//!
//! # Architecture
//!
//! - **Upstream**: typed [`reqwest`] client over the plugin's REST surface,
//!   with strict path policy and mapped errors
//! - **Caching**: two single-slot TTL caches (vault structure, note list),
//!   invalidated by every write
//! - **Discovery**: upstream listing with filesystem fallback, lazy header
//!   enrichment in bounded-parallel batches
//! - **Protocol**: hand-rolled JSON-RPC 2.0 over axum, with SSE chunking
//!   for large payloads
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`vault`] — The cached, batched vault access layer and upstream client
//! - [`template`] — Folder templates and format-preserving note merges
//! - [`tools`] — The tool registry and per-tool handlers
//! - [`resources`] — The `vault://notes/` resource router
//! - [`server`] — The JSON-RPC HTTP front-end

pub mod cache;
pub mod config;
pub mod envelope;
pub mod error;
pub mod fanout;
pub mod frontmatter;
pub mod protocol;
pub mod resources;
pub mod server;
pub mod stream;
pub mod template;
pub mod tools;
pub mod vault;
