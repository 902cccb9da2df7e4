//! # schemaform
//!
//! Schema-driven editing of a messaging gateway's configuration.
//!
//! The gateway serves its configuration as a snapshot (structured value, raw
//! text, validation verdict) and its shape as a JSON Schema with per-field UI
//! hints. This crate keeps both in a single [`ConfigState`], turns the schema
//! into a normalized [`SchemaNode`] tree a form can be rendered from, and
//! applies the form's edits as path patches on a working copy.
//!
//! ## Example
//!
//! ```rust
//! use schemaform::{ConfigState, Snapshot, path};
//! use serde_json::json;
//!
//! let mut state = ConfigState::default();
//! state.apply_config_snapshot(Snapshot::from_value(&json!({
//!     "config": {"slack": {"enabled": false}}
//! })));
//! state.update_form_value(&path!["slack", "enabled"], json!(true));
//!
//! assert!(state.dirty);
//! assert!(!state.projections.slack.enabled);
//! ```
//!
//! ## Modules
//!
//! - [`schema`] - Schema normalization and the unsupported-path set
//! - [`path`] - Path addressing into JSON values
//! - [`state`] - The editing state and its transitions
//! - [`controller`] - Transport round-trips around the state
//! - [`form`] - Form rendering and edit intents
//! - [`projection`] - Typed per-integration views of the config

#[macro_use]
extern crate log;

pub mod controller;
pub mod error;
pub mod form;
pub mod hints;
pub mod path;
pub mod projection;
pub mod schema;
pub mod snapshot;
pub mod state;
pub mod transport;

pub use controller::ConfigController;
pub use error::{ConfigError, Result};
pub use form::{Control, FormNode, PatchIntent, render_form};
pub use hints::{UiHint, UiHints};
pub use path::PathSegment;
pub use schema::{SchemaAnalysis, SchemaKind, SchemaNode};
pub use serde_json::Value;
pub use snapshot::{Issue, SchemaResponse, Snapshot};
pub use state::{ConfigState, FormMode};
pub use transport::Transport;
