//! JSON Schema reduction for form rendering.
//!
//! Raw schemas may use any JSON Schema construct. The form renderer only
//! understands a small closed set of shapes, so every node is reduced to a
//! [`SchemaNode`] whose [`SchemaKind`] is one of object, array, string,
//! number, integer, boolean or enum. Unions of literals become enums, a
//! union of one schema with `null` becomes that schema marked nullable.
//! Whatever cannot be reduced is kept verbatim as [`SchemaKind::Raw`] and its
//! dotted path is recorded in [`SchemaAnalysis::unsupported`], so the UI can
//! fall back to raw editing for that subtree instead of corrupting it.
//!
//! Paths use object-key segments; array items and map values are written
//! as `*`, e.g. `discord.guilds.*.channels`.

mod node;
mod normalize;

pub use node::{AdditionalProperties, SchemaAnalysis, SchemaKind, SchemaNode};
pub(crate) use node::schema_key;
pub use normalize::{analyze, normalize};
