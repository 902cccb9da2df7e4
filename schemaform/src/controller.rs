//! Network-facing driver around [`ConfigState`].
//!
//! All state lives in one `Arc<Mutex<ConfigState>>` that is never locked
//! across an `.await`, so every transition is applied whole by a single
//! writer. Each round-trip holds an in-flight flag (`loading`, `saving`,
//! `schema_loading`); a call made while its flag is set is dropped, not
//! queued. Flags are cleared by a drop guard, so they reset on every exit
//! path including cancellation.
//!
//! Listeners registered with [`ConfigController::subscribe`] run after every
//! state change with the state locked; they must not call back into the
//! controller.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Value, json};

use crate::{
    error::ConfigError,
    form::{FormNode, PatchIntent, render_form},
    path::PathSegment,
    snapshot::{SchemaResponse, Snapshot},
    state::{ConfigState, FormMode},
    transport::{CONFIG_APPLY, CONFIG_GET, CONFIG_SCHEMA, CONFIG_SET, Transport},
};

/// Callback run after each state change.
pub type Listener = Arc<dyn Fn(&ConfigState) + Send + Sync>;

type Flag = fn(&mut ConfigState) -> &mut bool;

fn loading(s: &mut ConfigState) -> &mut bool {
    &mut s.loading
}

fn saving(s: &mut ConfigState) -> &mut bool {
    &mut s.saving
}

fn schema_loading(s: &mut ConfigState) -> &mut bool {
    &mut s.schema_loading
}

fn lock(state: &Mutex<ConfigState>) -> MutexGuard<'_, ConfigState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds an in-flight flag set until dropped.
struct InFlight {
    state: Arc<Mutex<ConfigState>>,
    flag: Flag,
}

impl InFlight {
    fn acquire(state: &Arc<Mutex<ConfigState>>, flag: Flag) -> Option<Self> {
        let mut st = lock(state);
        let f = flag(&mut st);
        if *f {
            return None;
        }
        *f = true;
        Some(Self {
            state: state.clone(),
            flag,
        })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        *(self.flag)(&mut lock(&self.state)) = false;
    }
}

/// Shared handle to the editing state and its transport.
#[derive(Clone, Default)]
pub struct ConfigController {
    state: Arc<Mutex<ConfigState>>,
    transport: Option<Arc<dyn Transport>>,
    listeners: Arc<Mutex<Vec<Listener>>>,
}

impl ConfigController {
    /// A controller without a connection; network operations are no-ops.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport: Some(transport),
            ..Self::default()
        }
    }

    /// Attach or detach the connection.
    pub fn set_transport(&mut self, transport: Option<Arc<dyn Transport>>) {
        self.transport = transport;
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    pub fn subscribe(&self, listener: impl Fn(&ConfigState) + Send + Sync + 'static) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    /// Read the state.
    pub fn with_state<R>(&self, f: impl FnOnce(&ConfigState) -> R) -> R {
        f(&lock(&self.state))
    }

    /// Copy of the current state.
    pub fn state(&self) -> ConfigState {
        self.with_state(Clone::clone)
    }

    fn update<R>(&self, f: impl FnOnce(&mut ConfigState) -> R) -> R {
        let r = f(&mut lock(&self.state));
        self.notify();
        r
    }

    fn notify(&self) {
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if listeners.is_empty() {
            return;
        }
        let st = lock(&self.state);
        for l in &listeners {
            l(&st);
        }
    }

    /// Fetch the config snapshot and apply it.
    ///
    /// Failures are kept in `last_error` and leave the previous state as is.
    pub async fn load(&self) {
        let Some(transport) = self.transport.clone() else {
            return;
        };
        let Some(guard) = InFlight::acquire(&self.state, loading) else {
            debug!("{CONFIG_GET} already in flight");
            return;
        };
        lock(&self.state).last_error = None;

        let result = transport.request(CONFIG_GET, json!({})).await;
        {
            let mut st = lock(&self.state);
            match result {
                Ok(v) if v.is_object() => st.apply_config_snapshot(Snapshot::from_value(&v)),
                Ok(_) => st.last_error = Some(invalid_response(CONFIG_GET)),
                Err(e) => st.last_error = Some(transport_error(CONFIG_GET, &e)),
            }
        }
        drop(guard);
        self.notify();
    }

    /// Fetch the schema bundle and apply it.
    pub async fn load_schema(&self) {
        let Some(transport) = self.transport.clone() else {
            return;
        };
        let Some(guard) = InFlight::acquire(&self.state, schema_loading) else {
            debug!("{CONFIG_SCHEMA} already in flight");
            return;
        };

        let result = transport.request(CONFIG_SCHEMA, json!({})).await;
        {
            let mut st = lock(&self.state);
            match result {
                Ok(v) if v.is_object() => st.apply_config_schema(SchemaResponse::from_value(&v)),
                Ok(_) => st.last_error = Some(invalid_response(CONFIG_SCHEMA)),
                Err(e) => st.last_error = Some(transport_error(CONFIG_SCHEMA, &e)),
            }
        }
        drop(guard);
        self.notify();
    }

    /// Persist the edited config, then reload it.
    pub async fn save(&self) {
        self.commit(CONFIG_SET).await;
    }

    /// Persist the edited config and have the gateway restart with it, then
    /// reload it.
    pub async fn apply(&self) {
        self.commit(CONFIG_APPLY).await;
    }

    async fn commit(&self, method: &'static str) {
        let Some(transport) = self.transport.clone() else {
            return;
        };
        let Some(guard) = InFlight::acquire(&self.state, saving) else {
            debug!("{method} dropped, a save is already in flight");
            return;
        };

        let body = {
            let mut st = lock(&self.state);
            st.last_error = None;
            st.save_body()
        };
        let raw = match body {
            Ok(raw) => raw,
            Err(e) => {
                lock(&self.state).last_error = Some(e.to_string());
                drop(guard);
                self.notify();
                return;
            }
        };

        match transport.request(method, json!({ "raw": raw })).await {
            Ok(_) => {
                lock(&self.state).dirty = false;
                self.load().await;
            }
            Err(e) => lock(&self.state).last_error = Some(transport_error(method, &e)),
        }
        drop(guard);
        self.notify();
    }

    pub fn update_form_value(&self, path: &[PathSegment], value: Value) {
        self.update(|st| st.update_form_value(path, value));
    }

    pub fn remove_form_value(&self, path: &[PathSegment]) {
        self.update(|st| st.remove_form_value(path));
    }

    pub fn apply_patch(&self, intent: PatchIntent) {
        self.update(|st| st.apply_patch(intent));
    }

    pub fn set_raw(&self, text: impl Into<String>) {
        self.update(|st| st.set_raw(text));
    }

    pub fn set_form_mode(&self, mode: FormMode) -> Result<(), ConfigError> {
        self.update(|st| st.set_form_mode(mode))
    }

    /// Render the form for the current value, if a schema is loaded.
    pub fn render(&self) -> Option<FormNode> {
        self.with_state(|st| {
            st.schema
                .as_ref()
                .map(|analysis| render_form(analysis, &st.form_value(), &st.ui_hints))
        })
    }
}

fn invalid_response(method: &str) -> String {
    let e = ConfigError::InvalidResponse {
        method: method.to_string(),
        message: "expected an object".to_string(),
    };
    warn!("{e}");
    e.to_string()
}

fn transport_error(method: &str, e: &anyhow::Error) -> String {
    warn!("{method} failed: {e:#}");
    ConfigError::Transport {
        method: method.to_string(),
        message: format!("{e:#}"),
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::bail;
    use async_trait::async_trait;

    use super::*;
    use crate::path;

    /// In-memory gateway that stores whatever it is sent.
    #[derive(Default)]
    struct MockGateway {
        config: Mutex<Value>,
        calls: Mutex<Vec<String>>,
        failing: Mutex<Vec<&'static str>>,
    }

    impl MockGateway {
        fn with_config(config: Value) -> Arc<Self> {
            Arc::new(Self {
                config: Mutex::new(config),
                ..Default::default()
            })
        }

        fn fail(&self, method: &'static str) {
            self.failing.lock().unwrap().push(method);
        }

        fn count(&self, method: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|m| *m == method).count()
        }
    }

    #[async_trait]
    impl Transport for MockGateway {
        async fn request(&self, method: &str, params: Value) -> anyhow::Result<Value> {
            self.calls.lock().unwrap().push(method.to_string());
            tokio::task::yield_now().await;
            if self.failing.lock().unwrap().iter().any(|m| *m == method) {
                bail!("gateway unreachable");
            }
            match method {
                CONFIG_GET => Ok(json!({
                    "config": self.config.lock().unwrap().clone(),
                    "valid": true
                })),
                CONFIG_SCHEMA => Ok(json!({
                    "schema": {
                        "type": "object",
                        "properties": {
                            "slack": {
                                "type": "object",
                                "properties": {"enabled": {"type": "boolean"}}
                            }
                        }
                    },
                    "uiHints": {"slack.enabled": {"label": "Enable Slack"}},
                    "version": "2026.10"
                })),
                CONFIG_SET | CONFIG_APPLY => {
                    let raw = params["raw"].as_str().unwrap_or_default();
                    *self.config.lock().unwrap() = serde_json::from_str(raw)?;
                    Ok(json!({"ok": true}))
                }
                other => bail!("unknown method {other}"),
            }
        }
    }

    fn controller(gw: &Arc<MockGateway>) -> ConfigController {
        ConfigController::with_transport(gw.clone())
    }

    #[tokio::test]
    async fn test_no_transport_is_noop() {
        let c = ConfigController::new();
        c.load().await;
        c.load_schema().await;
        c.save().await;
        let st = c.state();
        assert!(st.snapshot.is_none());
        assert!(st.schema.is_none());
        assert!(st.last_error.is_none());
        assert!(!c.is_connected());
    }

    #[tokio::test]
    async fn test_transport_attached_and_detached() {
        let gw = MockGateway::with_config(json!({"a": 1}));
        let mut c = ConfigController::new();
        c.set_transport(Some(gw.clone()));
        assert!(c.is_connected());
        c.load().await;
        assert_eq!(c.state().form, Some(json!({"a": 1})));

        c.set_transport(None);
        assert!(!c.is_connected());
        c.update_form_value(&path!["a"], json!(2));
        c.save().await;
        assert_eq!(gw.count(CONFIG_SET), 0);
        assert!(c.state().dirty);
    }

    #[tokio::test]
    async fn test_load_and_schema() {
        let gw = MockGateway::with_config(json!({"slack": {"enabled": true}}));
        let c = controller(&gw);
        c.load().await;
        c.load_schema().await;

        let st = c.state();
        assert!(!st.loading && !st.schema_loading);
        assert_eq!(st.valid, Some(true));
        assert!(st.projections.slack.enabled);
        assert_eq!(st.schema_version.as_deref(), Some("2026.10"));
        assert!(st.form_supported());

        let form = c.render().unwrap();
        let enabled = form.find(&["slack", "enabled"]).unwrap();
        assert_eq!(enabled.label, "Enable Slack");
        assert!(matches!(enabled.control, crate::form::Control::Toggle { checked: true }));
    }

    #[tokio::test]
    async fn test_concurrent_loads_send_once() {
        let gw = MockGateway::with_config(json!({}));
        let c = controller(&gw);
        tokio::join!(c.load(), c.load());
        assert_eq!(gw.count(CONFIG_GET), 1);
        assert!(!c.state().loading);
    }

    #[tokio::test]
    async fn test_concurrent_saves_send_once() {
        let gw = MockGateway::with_config(json!({"a": 1}));
        let c = controller(&gw);
        c.load().await;
        c.update_form_value(&path!["a"], json!(2));

        tokio::join!(c.save(), c.save());
        assert_eq!(gw.count(CONFIG_SET), 1);
        assert_eq!(*gw.config.lock().unwrap(), json!({"a": 2}));

        let st = c.state();
        assert!(!st.saving);
        assert!(!st.dirty);
        assert_eq!(st.form, Some(json!({"a": 2})));
    }

    #[tokio::test]
    async fn test_load_failure_keeps_state() {
        let gw = MockGateway::with_config(json!({"a": 1}));
        let c = controller(&gw);
        c.load().await;
        *gw.config.lock().unwrap() = json!({"a": 5});
        gw.fail(CONFIG_GET);
        c.load().await;

        let st = c.state();
        assert_eq!(st.form, Some(json!({"a": 1})));
        assert!(!st.loading);
        assert_eq!(
            st.last_error.as_deref(),
            Some("config.get failed: gateway unreachable")
        );
    }

    #[tokio::test]
    async fn test_save_failure_keeps_edits() {
        let gw = MockGateway::with_config(json!({"a": 1}));
        let c = controller(&gw);
        c.load().await;
        c.update_form_value(&path!["a"], json!(3));
        gw.fail(CONFIG_SET);
        c.save().await;

        let st = c.state();
        assert!(st.dirty);
        assert!(!st.saving);
        assert_eq!(st.form, Some(json!({"a": 3})));
        assert!(st.last_error.unwrap().starts_with("config.set failed"));
        assert_eq!(gw.count(CONFIG_GET), 1);
    }

    #[tokio::test]
    async fn test_dirty_form_survives_reload() {
        let gw = MockGateway::with_config(json!({"a": 1}));
        let c = controller(&gw);
        c.load().await;
        c.update_form_value(&path!["b"], json!("x"));
        *gw.config.lock().unwrap() = json!({"a": 9});
        c.load().await;

        let st = c.state();
        assert_eq!(st.form, Some(json!({"a": 1, "b": "x"})));
        assert_eq!(st.raw, "{\n  \"a\": 9\n}\n");
    }

    #[tokio::test]
    async fn test_apply_sends_raw_in_raw_mode() {
        let gw = MockGateway::with_config(json!({"a": 1}));
        let c = controller(&gw);
        c.load().await;
        c.set_form_mode(FormMode::Raw).unwrap();
        c.set_raw("{\"a\": 4}");
        c.apply().await;

        assert_eq!(gw.count(CONFIG_APPLY), 1);
        assert_eq!(gw.count(CONFIG_SET), 0);
        let st = c.state();
        assert!(!st.dirty);
        assert_eq!(st.raw, "{\n  \"a\": 4\n}\n");
    }

    #[tokio::test]
    async fn test_non_object_response_is_reported() {
        struct Echo;

        #[async_trait]
        impl Transport for Echo {
            async fn request(&self, _: &str, _: Value) -> anyhow::Result<Value> {
                Ok(json!("nope"))
            }
        }

        let c = ConfigController::with_transport(Arc::new(Echo));
        c.load().await;
        let st = c.state();
        assert!(st.snapshot.is_none());
        assert_eq!(
            st.last_error.as_deref(),
            Some("unexpected config.get response: expected an object")
        );
    }

    #[tokio::test]
    async fn test_listeners_fire() {
        let gw = MockGateway::with_config(json!({}));
        let c = controller(&gw);
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        c.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        c.load().await;
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        c.apply_patch(PatchIntent {
            path: path!["x"],
            value: Some(json!(1)),
        });
        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert!(c.with_state(|st| st.dirty));
    }
}
