//! Formatting collaborator: turns a record into the bytes a destination writes
//!
//! Provides the [`Formatter`] capability and a [`StandardFormatter`] with
//! several output layouts:
//! - Text: Human-readable format (default)
//! - Json: Machine-readable JSON format
//! - Logfmt: Key-value format compatible with log aggregation tools
//! - MessageOnly: Just the message text

use super::error::Result;
use super::log_record::LogRecord;
use super::timestamp::TimestampFormat;
use serde::{Deserialize, Serialize};

/// Renders a record into bytes.
///
/// Rendering must be deterministic for a given record and must not change it.
/// Closures of the right shape are formatters too.
pub trait Formatter: Send + Sync {
    fn render(&self, record: &LogRecord) -> Result<Vec<u8>>;
}

impl<F> Formatter for F
where
    F: Fn(&LogRecord) -> Result<Vec<u8>> + Send + Sync,
{
    fn render(&self, record: &LogRecord) -> Result<Vec<u8>> {
        self(record)
    }
}

/// Output layout for [`StandardFormatter`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Example: `[2025-01-08T10:30:45.123Z] [INFO ] [app] main - Request processed`
    #[default]
    Text,

    /// Example: `{"timestamp":"2025-01-08T10:30:45.123Z","level":"INFO","logger":"app","message":"Request processed"}`
    Json,

    /// Example: `timestamp=2025-01-08T10:30:45.123Z level=INFO logger=app message="Request processed"`
    Logfmt,

    /// Example: `Request processed`
    MessageOnly,
}

#[derive(Debug, Clone)]
pub struct StandardFormatter {
    output_format: OutputFormat,
    timestamp_format: TimestampFormat,
    use_colors: bool,
    escape_newlines: bool,
}

impl StandardFormatter {
    pub fn new() -> Self {
        Self {
            output_format: OutputFormat::default(),
            timestamp_format: TimestampFormat::default(),
            use_colors: false,
            escape_newlines: true,
        }
    }

    /// Message text only, one record per line.
    pub fn message_only() -> Self {
        Self::new().with_output_format(OutputFormat::MessageOnly)
    }

    #[must_use]
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Color the level tag in text output. Ignored without the `console` feature.
    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Replace `\n`, `\r` and `\t` in messages with escape sequences so one
    /// record can never masquerade as several lines. On by default.
    #[must_use]
    pub fn with_escape_newlines(mut self, escape: bool) -> Self {
        self.escape_newlines = escape;
        self
    }

    pub fn output_format(&self) -> &OutputFormat {
        &self.output_format
    }

    fn sanitize(&self, message: &str) -> String {
        if self.escape_newlines {
            message
                .replace('\n', "\\n")
                .replace('\r', "\\r")
                .replace('\t', "\\t")
        } else {
            message.to_string()
        }
    }

    fn level_tag(&self, record: &LogRecord) -> String {
        let tag = format!("{:5}", record.level().to_str());
        #[cfg(feature = "console")]
        if self.use_colors {
            use colored::Colorize;
            return tag.color(record.level().color_code()).to_string();
        }
        tag
    }

    fn format_text(&self, record: &LogRecord, message: &str) -> String {
        let mut line = format!(
            "[{}] [{}] [{}] {} - {}",
            self.timestamp_format.format(record.timestamp()),
            self.level_tag(record),
            record.logger_name(),
            record.thread_label(),
            message
        );
        if let Some(location) = record.location() {
            line.push_str(&format!(" ({}:{})", location.file, location.line));
        }
        line
    }

    fn format_json(&self, record: &LogRecord, message: &str) -> Result<String> {
        let mut json_obj = serde_json::Map::new();

        let timestamp = if self.timestamp_format.is_numeric() {
            match self.timestamp_format {
                TimestampFormat::Unix => record.timestamp().timestamp().into(),
                TimestampFormat::UnixMillis => record.timestamp().timestamp_millis().into(),
                _ => record.timestamp().timestamp_micros().into(),
            }
        } else {
            serde_json::Value::String(self.timestamp_format.format(record.timestamp()))
        };
        json_obj.insert("timestamp".to_string(), timestamp);
        json_obj.insert("level".to_string(), record.level().to_str().into());
        json_obj.insert("logger".to_string(), record.logger_name().into());
        json_obj.insert("message".to_string(), message.into());
        json_obj.insert("thread_id".to_string(), record.thread_id().into());
        if let Some(name) = record.thread_name() {
            json_obj.insert("thread_name".to_string(), name.into());
        }
        if let Some(location) = record.location() {
            json_obj.insert("location".to_string(), serde_json::to_value(location)?);
        }

        Ok(serde_json::to_string(&serde_json::Value::Object(json_obj))?)
    }

    fn format_logfmt(&self, record: &LogRecord, message: &str) -> String {
        let mut parts = vec![
            format!(
                "timestamp={}",
                escape_logfmt_value(&self.timestamp_format.format(record.timestamp()))
            ),
            format!("level={}", record.level().to_str()),
            format!("logger={}", escape_logfmt_value(record.logger_name())),
            // always quoted
            format!("message={}", quote_logfmt_value(message)),
            format!("thread_id={}", escape_logfmt_value(record.thread_id())),
        ];
        if let Some(name) = record.thread_name() {
            parts.push(format!("thread_name={}", escape_logfmt_value(name)));
        }
        if let Some(location) = record.location() {
            parts.push(format!("file={}", escape_logfmt_value(location.file)));
            parts.push(format!("line={}", location.line));
        }
        parts.join(" ")
    }
}

impl Default for StandardFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for StandardFormatter {
    fn render(&self, record: &LogRecord) -> Result<Vec<u8>> {
        let message = self.sanitize(&record.message()?);
        let mut line = match self.output_format {
            OutputFormat::Text => self.format_text(record, &message),
            OutputFormat::Json => self.format_json(record, &message)?,
            OutputFormat::Logfmt => self.format_logfmt(record, &message),
            OutputFormat::MessageOnly => message,
        };
        line.push('\n');
        Ok(line.into_bytes())
    }
}

fn escape_logfmt_value(value: &str) -> String {
    if value.contains(' ') || value.contains('"') || value.contains('=') {
        quote_logfmt_value(value)
    } else {
        value.to_string()
    }
}

fn quote_logfmt_value(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
