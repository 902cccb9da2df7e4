//! The configuration editing state record.
//!
//! [`ConfigState`] is plain data plus the synchronous transitions applied to
//! it. It has no knowledge of the transport; [`crate::controller`] drives the
//! network round-trips and calls into these methods once responses arrive.

use serde_json::Value;

use crate::{
    error::{ConfigError, Result},
    form::PatchIntent,
    hints::UiHints,
    path::{self, PathSegment},
    projection::Projections,
    schema::{self, SchemaAnalysis, SchemaKind},
    snapshot::{Issue, SchemaResponse, Snapshot, serialize_config},
};

/// Which view the user is editing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormMode {
    /// Structured, schema-driven form.
    #[default]
    Form,
    /// Raw text.
    Raw,
}

/// Everything the editor knows about the configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigState {
    /// A `config.get` is in flight.
    pub loading: bool,
    /// A `config.set`/`config.apply` is in flight.
    pub saving: bool,
    /// A `config.schema` is in flight.
    pub schema_loading: bool,

    /// Last snapshot received from the gateway.
    pub snapshot: Option<Snapshot>,
    /// Raw text view of the config.
    pub raw: String,
    pub valid: Option<bool>,
    pub issues: Vec<Issue>,

    /// Schema as served, before normalization.
    pub raw_schema: Option<Value>,
    /// Normalized schema, `None` until a schema has been applied.
    pub schema: Option<SchemaAnalysis>,
    pub schema_version: Option<String>,
    pub ui_hints: UiHints,

    /// Structured value under edit.
    pub form: Option<Value>,
    /// The form or raw text holds edits not yet saved.
    pub dirty: bool,
    pub mode: FormMode,

    /// Last failure, for display.
    pub last_error: Option<String>,
    pub projections: Projections,
}

impl ConfigState {
    /// Take a freshly fetched snapshot as the new ground truth.
    ///
    /// Projections are always recomputed; the form value is only replaced
    /// when it holds no unsaved edits.
    pub fn apply_config_snapshot(&mut self, snapshot: Snapshot) {
        let config = snapshot.config_value();

        self.raw = match (&snapshot.raw, &snapshot.config) {
            (Some(raw), _) => raw.clone(),
            (None, Some(_)) => match serialize_config(&config) {
                Ok(text) => text,
                Err(e) => {
                    warn!("failed to render config snapshot: {e}");
                    self.raw.clone()
                }
            },
            (None, None) => self.raw.clone(),
        };
        self.valid = snapshot.valid;
        self.issues = snapshot.issues.clone();
        self.projections = match &snapshot.config {
            Some(map) => Projections::derive(map),
            None => Projections::default(),
        };

        if !self.dirty {
            self.form = Some(config);
        } else {
            debug!("keeping dirty form over incoming snapshot");
        }

        info!(
            "config snapshot applied: valid={:?}, {} issue(s)",
            self.valid,
            self.issues.len()
        );
        self.snapshot = Some(snapshot);
    }

    /// Store the schema bundle, normalizing the schema on arrival.
    pub fn apply_config_schema(&mut self, response: SchemaResponse) {
        let analysis = schema::analyze(response.schema.as_ref());
        info!(
            "config schema applied: version={:?}, {} unsupported path(s)",
            response.version,
            analysis.unsupported.len()
        );
        self.raw_schema = response.schema;
        self.schema = Some(analysis);
        self.ui_hints = response.ui_hints;
        self.schema_version = response.version;
    }

    /// Current form value, seeded from the snapshot when no edit happened yet.
    pub fn form_value(&self) -> Value {
        match &self.form {
            Some(form) => form.clone(),
            None => self
                .snapshot
                .as_ref()
                .map(Snapshot::config_value)
                .unwrap_or_else(|| Value::Object(Default::default())),
        }
    }

    /// Parse a dotted path against the form value.
    ///
    /// An all-digit segment is a key wherever it lands on an object, so
    /// numeric map keys such as guild ids stay addressable. Past the end of
    /// the value the schema decides; with neither, digits are indices.
    pub fn resolve_path(&self, dotted: &str) -> Vec<PathSegment> {
        let form = self.form_value();
        let mut out = Vec::new();
        for (seg, text) in path::parse_path(dotted).into_iter().zip(dotted.split('.')) {
            let under_object = match path::get(&form, &out) {
                Some(v) => v.is_object(),
                None => self
                    .schema
                    .as_ref()
                    .and_then(|a| a.lookup(&out))
                    .is_some_and(|n| matches!(n.kind, SchemaKind::Object { .. })),
            };
            out.push(match seg {
                PathSegment::Index(_) if under_object => PathSegment::Key(text.to_string()),
                seg => seg,
            });
        }
        out
    }

    /// Write `value` at `path` in the form value and mark it dirty.
    pub fn update_form_value(&mut self, path: &[PathSegment], value: Value) {
        let mut next = self.form_value();
        path::set(&mut next, path, value);
        self.form = Some(next);
        self.dirty = true;
    }

    /// Remove the value at `path` from the form value and mark it dirty.
    pub fn remove_form_value(&mut self, path: &[PathSegment]) {
        let mut next = self.form_value();
        path::remove(&mut next, path);
        self.form = Some(next);
        self.dirty = true;
    }

    /// Apply a patch emitted by the form renderer.
    pub fn apply_patch(&mut self, intent: PatchIntent) {
        match intent.value {
            Some(value) => self.update_form_value(&intent.path, value),
            None => self.remove_form_value(&intent.path),
        }
    }

    /// Replace the raw text with the user's edit.
    pub fn set_raw(&mut self, text: impl Into<String>) {
        self.raw = text.into();
        self.dirty = true;
    }

    /// Switch between form and raw editing, carrying edits across.
    ///
    /// Leaving the form re-renders the edited value as raw text. Entering the
    /// form parses edited raw text; text that is not a JSON object keeps the
    /// editor in raw mode.
    pub fn set_form_mode(&mut self, mode: FormMode) -> Result<()> {
        if mode == self.mode {
            return Ok(());
        }
        if self.dirty {
            match mode {
                FormMode::Raw => {
                    if let Some(form) = &self.form {
                        self.raw = serialize_config(form)?;
                    }
                }
                FormMode::Form => {
                    let parsed: Value = serde_json::from_str(&self.raw)
                        .map_err(|e| ConfigError::RawParse(e.to_string()))?;
                    if !parsed.is_object() {
                        return Err(ConfigError::RawParse(
                            "top-level value must be an object".to_string(),
                        ));
                    }
                    self.form = Some(parsed);
                }
            }
        }
        self.mode = mode;
        Ok(())
    }

    /// Text to send on save: the form value in form mode, else the raw text.
    pub fn save_body(&self) -> Result<String> {
        match (self.mode, &self.form) {
            (FormMode::Form, Some(form)) => Ok(serialize_config(form)?),
            _ => Ok(self.raw.clone()),
        }
    }

    /// Whether the form can render the config, i.e. a usable schema exists.
    pub fn form_supported(&self) -> bool {
        self.schema
            .as_ref()
            .is_some_and(|s| !s.root_unsupported())
    }
}
