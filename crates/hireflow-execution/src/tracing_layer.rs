//! Tracing layer that forwards hireflow log events to the hosting view.
//!
//! Only events whose target starts with `hireflow` are forwarded; dependency
//! noise (hyper, reqwest) stays in the regular log output.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

const FORWARDED_TARGET_PREFIX: &str = "hireflow";

/// A log line as the view receives it.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEvent {
    /// Module path of the call site, e.g. `hireflow_execution::orchestrator`
    pub target: String,
    /// Upper-case level name
    pub level: String,
    pub message: String,
    /// Structured fields other than the message
    pub fields: HashMap<String, Value>,
    pub timestamp: String,
}

pub struct TraceEventLayer {
    sender: mpsc::UnboundedSender<TraceEvent>,
}

impl TraceEventLayer {
    pub fn new(sender: mpsc::UnboundedSender<TraceEvent>) -> Self {
        Self { sender }
    }
}

impl<S> Layer<S> for TraceEventLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let target = event.metadata().target();
        if !target.starts_with(FORWARDED_TARGET_PREFIX) {
            return;
        }

        let mut fields = HashMap::new();
        event.record(&mut FieldVisitor(&mut fields));
        let message = match fields.remove("message") {
            Some(Value::String(message)) => message,
            Some(other) => other.to_string(),
            None => String::new(),
        };

        let _ = self.sender.send(TraceEvent {
            target: target.to_string(),
            level: event.metadata().level().to_string(),
            message,
            fields,
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
    }
}

/// Collects event fields as JSON values keyed by field name.
struct FieldVisitor<'a>(&'a mut HashMap<String, Value>);

impl FieldVisitor<'_> {
    fn insert(&mut self, field: &Field, value: impl Into<Value>) {
        self.0.insert(field.name().to_string(), value.into());
    }
}

impl Visit for FieldVisitor<'_> {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, value);
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, value);
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value);
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, format!("{:?}", value));
    }
}
