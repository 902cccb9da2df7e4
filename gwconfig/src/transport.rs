//! A [`Transport`] backed by a local config file.
//!
//! Stands in for a running gateway: `config.get` reads and validates the
//! file, `config.set`/`config.apply` write it back after taking a backup and
//! `config.schema` serves the schema file next to it, or the built-in schema
//! when there is none.

use std::{
    path::{Path, PathBuf},
    time::SystemTime,
};

use anyhow::{Context, bail};
use async_trait::async_trait;
use schemaform::transport::{CONFIG_APPLY, CONFIG_GET, CONFIG_SCHEMA, CONFIG_SET, Transport};
use serde_json::{Map, Value, json};
use tokio::fs;

use crate::model;

/// Derive a default schema path from a config path: `a/b.json` becomes
/// `a/b-schema.json`.
pub fn default_schema_by_init(config: &Path) -> PathBuf {
    let stem = config
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = format!("{stem}-schema.json");

    match config.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// File formats a config may be stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> anyhow::Result<Self> {
        match path.extension().and_then(|s| s.to_str()).unwrap_or("") {
            "json" => Ok(Format::Json),
            "toml" | "tml" => Ok(Format::Toml),
            ext => bail!("Unsupported config file extension: {ext:?}"),
        }
    }

    fn parse(self, text: &str) -> anyhow::Result<Value> {
        Ok(match self {
            Format::Json => serde_json::from_str(text)?,
            Format::Toml => {
                let v: toml::Value = toml::from_str(text)?;
                serde_json::to_value(v)?
            }
        })
    }

    fn render(self, value: &Value) -> anyhow::Result<String> {
        Ok(match self {
            Format::Json => schemaform::snapshot::serialize_config(value)?,
            // TOML has no null.
            Format::Toml => toml::to_string_pretty(&strip_nulls(value.clone()))?,
        })
    }
}

fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .filter(|v| !v.is_null())
                .map(strip_nulls)
                .collect(),
        ),
        other => other,
    }
}

/// Serves one config file as if it were a gateway.
#[derive(Debug, Clone)]
pub struct FileTransport {
    config: PathBuf,
    schema: PathBuf,
}

impl FileTransport {
    pub fn new(config: impl Into<PathBuf>, schema: Option<PathBuf>) -> Self {
        let config = config.into();
        let schema = schema.unwrap_or_else(|| default_schema_by_init(&config));
        Self { config, schema }
    }

    pub fn config_path(&self) -> &Path {
        &self.config
    }

    async fn get(&self) -> anyhow::Result<Value> {
        let format = Format::of(&self.config)?;
        if !fs::try_exists(&self.config).await? {
            debug!("{} does not exist, serving empty config", self.config.display());
            return Ok(json!({"config": {}, "raw": "", "valid": true, "issues": []}));
        }

        let text = fs::read_to_string(&self.config)
            .await
            .with_context(|| format!("Failed to read {}", self.config.display()))?;
        if text.trim().is_empty() {
            return Ok(json!({"config": {}, "raw": text, "valid": true, "issues": []}));
        }

        let value = match format.parse(&text) {
            Ok(v @ Value::Object(_)) => v,
            Ok(_) => return Ok(Self::unparsed(text, "top-level value must be an object")),
            Err(e) => return Ok(Self::unparsed(text, &format!("{e:#}"))),
        };
        let issues = model::validate(&value);
        let mut snapshot = json!({
            "config": value,
            "valid": issues.is_empty(),
            "issues": issues,
        });
        // The raw view is JSON text; a TOML file's text is not.
        if format == Format::Json {
            snapshot["raw"] = Value::String(text);
        }
        Ok(snapshot)
    }

    fn unparsed(text: String, message: &str) -> Value {
        json!({
            "raw": text,
            "valid": false,
            "issues": [{"path": "", "message": message}],
        })
    }

    async fn schema(&self) -> anyhow::Result<Value> {
        let schema = if fs::try_exists(&self.schema).await? {
            let text = fs::read_to_string(&self.schema)
                .await
                .with_context(|| format!("Failed to read {}", self.schema.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Invalid schema file {}", self.schema.display()))?
        } else {
            debug!(
                "schema file {} not found, using built-in schema",
                self.schema.display()
            );
            model::schema()?
        };
        Ok(json!({
            "schema": schema,
            "uiHints": model::ui_hints(),
            "version": env!("CARGO_PKG_VERSION"),
        }))
    }

    async fn set(&self, params: &Value) -> anyhow::Result<Value> {
        let Some(raw) = params.get("raw").and_then(Value::as_str) else {
            bail!("missing `raw` parameter");
        };
        let value: Value = serde_json::from_str(raw).context("raw config is not valid JSON")?;
        if !value.is_object() {
            bail!("top-level value must be an object");
        }

        let format = Format::of(&self.config)?;
        let content = format.render(&value)?;

        if fs::try_exists(&self.config).await? {
            let backup = self.backup_path()?;
            fs::copy(&self.config, &backup).await?;
            info!("backup written to {}", backup.display());
        }
        fs::write(&self.config, content)
            .await
            .with_context(|| format!("Failed to write {}", self.config.display()))?;
        Ok(json!({"ok": true}))
    }

    fn backup_path(&self) -> anyhow::Result<PathBuf> {
        let ext = self
            .config
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let secs = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)?
            .as_secs();
        Ok(self.config.with_extension(format!("bk-{secs}.{ext}")))
    }
}

#[async_trait]
impl Transport for FileTransport {
    async fn request(&self, method: &str, params: Value) -> anyhow::Result<Value> {
        debug!("{method} -> {}", self.config.display());
        match method {
            CONFIG_GET => self.get().await,
            CONFIG_SCHEMA => self.schema().await,
            CONFIG_SET => self.set(&params).await,
            CONFIG_APPLY => {
                let r = self.set(&params).await?;
                info!("config written; no gateway process to restart");
                Ok(r)
            }
            other => bail!("unsupported method {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use schemaform::{ConfigController, path};

    use super::*;

    #[test]
    fn test_schema_default() {
        let schema_path = default_schema_by_init(Path::new("config.toml"));
        assert_eq!(schema_path, PathBuf::from("config-schema.json"));
        let schema_path = default_schema_by_init(Path::new("dir/.gateway.json"));
        assert_eq!(schema_path, PathBuf::from("dir/.gateway-schema.json"));
    }

    #[tokio::test]
    async fn test_missing_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let t = FileTransport::new(dir.path().join("gw.json"), None);
        let v = t.request(CONFIG_GET, json!({})).await.unwrap();
        assert_eq!(v["config"], json!({}));
        assert_eq!(v["valid"], json!(true));
    }

    #[tokio::test]
    async fn test_get_reports_issues() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gw.json");
        std::fs::write(&path, r#"{"slack": {"mediaMaxMb": "lots"}}"#).unwrap();

        let t = FileTransport::new(&path, None);
        let v = t.request(CONFIG_GET, json!({})).await.unwrap();
        assert_eq!(v["valid"], json!(false));
        assert_eq!(v["issues"][0]["path"], json!("slack.mediaMaxMb"));
        assert_eq!(v["raw"], json!(r#"{"slack": {"mediaMaxMb": "lots"}}"#));

        std::fs::write(&path, "{ not json").unwrap();
        let v = t.request(CONFIG_GET, json!({})).await.unwrap();
        assert!(v.get("config").is_none());
        assert_eq!(v["raw"], json!("{ not json"));
    }

    #[tokio::test]
    async fn test_set_writes_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gw.json");
        std::fs::write(&path, "{}").unwrap();

        let t = FileTransport::new(&path, None);
        t.request(CONFIG_SET, json!({"raw": "{\"a\": 1}"}))
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\n  \"a\": 1\n}\n");

        let backups: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".bk-"))
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(std::fs::read_to_string(backups[0].path()).unwrap(), "{}");

        assert!(t.request(CONFIG_SET, json!({"raw": "[]"})).await.is_err());
        assert!(t.request(CONFIG_SET, json!({})).await.is_err());
        assert!(t.request("config.patch", json!({})).await.is_err());
    }

    #[tokio::test]
    async fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gw.toml");
        std::fs::write(&path, "[telegram]\nbotToken = \"t\"\n").unwrap();

        let t = FileTransport::new(&path, None);
        let v = t.request(CONFIG_GET, json!({})).await.unwrap();
        assert_eq!(v["config"], json!({"telegram": {"botToken": "t"}}));
        assert!(v.get("raw").is_none());

        t.request(
            CONFIG_SET,
            json!({"raw": "{\"telegram\": {\"botToken\": \"u\", \"proxy\": null}}"}),
        )
        .await
        .unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let back: toml::Value = toml::from_str(&text).unwrap();
        assert_eq!(back["telegram"]["botToken"].as_str(), Some("u"));
        assert!(back["telegram"].get("proxy").is_none());
    }

    #[tokio::test]
    async fn test_schema_file_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gw.json");
        let t = FileTransport::new(&path, None);
        let v = t.request(CONFIG_SCHEMA, json!({})).await.unwrap();
        assert!(v["schema"]["properties"].get("slack").is_some());
        assert_eq!(v["version"], json!(env!("CARGO_PKG_VERSION")));

        std::fs::write(
            dir.path().join("gw-schema.json"),
            r#"{"type": "object", "properties": {"only": {"type": "string"}}}"#,
        )
        .unwrap();
        let v = t.request(CONFIG_SCHEMA, json!({})).await.unwrap();
        assert_eq!(v["schema"]["properties"]["only"]["type"], json!("string"));
    }

    #[tokio::test]
    async fn test_edit_cycle_through_controller() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gw.json");
        std::fs::write(&path, r#"{"slack": {"enabled": false}}"#).unwrap();

        let c = ConfigController::with_transport(Arc::new(FileTransport::new(&path, None)));
        c.load_schema().await;
        c.load().await;
        assert!(!c.state().projections.slack.enabled);

        c.update_form_value(&path!["slack", "enabled"], json!(true));
        c.update_form_value(&path!["slack", "channels", "#ops"], json!({"allow": false}));
        c.save().await;

        let st = c.state();
        assert_eq!(st.last_error, None);
        assert!(!st.dirty);
        assert_eq!(st.valid, Some(true));
        assert!(st.projections.slack.enabled);
        assert_eq!(st.projections.slack.channels[0].key, "#ops");
        assert!(!st.projections.slack.channels[0].allow);
    }
}
