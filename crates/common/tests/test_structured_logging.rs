use common::{
    init_structured_logging, init_test_logging, JsonFormatter, LoggingConfig, StructuredLogEntry,
};
use serde_json::Value;
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// In-memory sink shared between the layer and the test
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().expect("buffer lock").clone();
        String::from_utf8(bytes)
            .expect("utf-8 output")
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("buffer lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_structured_log_entry_round_trips_fields() {
    let mut fields = HashMap::new();
    fields.insert("index".to_string(), Value::Number(1.into()));
    fields.insert("deferred".to_string(), Value::Bool(true));

    let entry = StructuredLogEntry {
        timestamp: chrono::Utc::now().to_rfc3339(),
        level: "TRACE".to_string(),
        target: "context::resolver".to_string(),
        message: "argument deferred".to_string(),
        fields,
    };

    let json = serde_json::to_value(&entry).expect("serializable");
    // Extra fields are flattened next to the fixed ones
    assert_eq!(json["index"], Value::Number(1.into()));
    assert_eq!(json["deferred"], Value::Bool(true));
    assert_eq!(json["message"], "argument deferred");

    let parsed: StructuredLogEntry = serde_json::from_value(json).expect("deserializable");
    assert_eq!(parsed.target, "context::resolver");
    assert_eq!(parsed.fields.len(), 2);
}

#[test]
fn test_logging_config_defaults() {
    let config = LoggingConfig::default();
    assert_eq!(config.level, Level::INFO);
    assert!(!config.json_output);

    let production = LoggingConfig::production();
    assert!(production.json_output);
    assert!(!production.color_output);
}

#[test]
fn test_second_global_init_is_rejected() {
    init_test_logging();
    // The test subscriber already owns the global slot
    assert!(init_structured_logging(LoggingConfig::production()).is_err());
}

#[test]
fn test_json_layer_writes_one_entry_per_event() {
    let buffer = SharedBuffer::default();
    let sink = buffer.clone();
    let subscriber = Registry::default().with(JsonFormatter::new(move || sink.clone()));

    tracing::subscriber::with_default(subscriber, || {
        tracing::debug!(
            class = "Greeter",
            index = 2u64,
            offset = -1i64,
            deferred = true,
            binding = ?Some("services.Greeter"),
            "argument deferred"
        );
        tracing::warn!(key = "port", "binding replaced");
    });

    let lines = buffer.lines();
    assert_eq!(lines.len(), 2);

    let entry: StructuredLogEntry = serde_json::from_str(&lines[0]).expect("JSON line");
    assert_eq!(entry.level, "DEBUG");
    assert_eq!(entry.message, "argument deferred");
    assert_eq!(entry.target, "test_structured_logging");
    assert_eq!(entry.fields["class"], Value::String("Greeter".to_string()));
    assert_eq!(entry.fields["index"], Value::Number(2u64.into()));
    assert_eq!(entry.fields["offset"], Value::Number((-1i64).into()));
    assert_eq!(entry.fields["deferred"], Value::Bool(true));
    assert_eq!(
        entry.fields["binding"],
        Value::String("Some(\"services.Greeter\")".to_string())
    );
    assert!(chrono::DateTime::parse_from_rfc3339(&entry.timestamp).is_ok());

    let entry: StructuredLogEntry = serde_json::from_str(&lines[1]).expect("JSON line");
    assert_eq!(entry.level, "WARN");
    assert_eq!(entry.fields["key"], Value::String("port".to_string()));
}
