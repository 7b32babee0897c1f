//! Field templates for table columns
//!
//! A template such as `{Owner.FirstName} {Owner.LastName}` mixes literal text
//! with dotted attribute paths. Templates are compiled once per invocation
//! and resolved against every fetched record. Missing or null values resolve
//! to an empty string so that optional relations never abort a listing.

use std::borrow::Cow;
use std::fmt::Write;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset};
use regex::Regex;

use crate::core::record::{EntityRecord, Value};

/// Date format used when none is configured
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static SERVICE_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/Date\((-?\d+)([+-]\d{2})?(\d{2})?\)/$").expect("valid date pattern")
});

/// A piece of a compiled template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied verbatim
    Literal(String),
    /// Attribute path, one key per element
    Path(Vec<String>),
}

/// A compiled field template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTemplate {
    source: String,
    segments: Vec<Segment>,
}

/// Formatting applied to leaf values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueFormat {
    /// strftime format for service dates
    pub date_format: String,
}

impl Default for ValueFormat {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl ValueFormat {
    pub fn new(date_format: impl Into<String>) -> Self {
        Self {
            date_format: date_format.into(),
        }
    }
}

impl FieldTemplate {
    /// Compile a template string
    ///
    /// `{{` and `}}` produce literal braces. An unterminated `{` and
    /// everything after it are kept as literal text.
    pub fn compile(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = source;

        while let Some(pos) = rest.find(|c: char| c == '{' || c == '}') {
            literal.push_str(&rest[..pos]);
            let tail = &rest[pos..];

            if tail.starts_with("{{") {
                literal.push('{');
                rest = &tail[2..];
            } else if tail.starts_with("}}") {
                literal.push('}');
                rest = &tail[2..];
            } else if tail.starts_with('}') {
                literal.push('}');
                rest = &tail[1..];
            } else if let Some(end) = tail[1..].find('}') {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                let path = tail[1..=end]
                    .split('.')
                    .map(|key| key.trim().to_string())
                    .collect();
                segments.push(Segment::Path(path));
                rest = &tail[end + 2..];
            } else {
                literal.push_str(tail);
                rest = "";
            }
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self {
            source: source.to_string(),
            segments,
        }
    }

    /// Compile a list of template strings
    pub fn compile_all<S: AsRef<str>>(sources: &[S]) -> Vec<Self> {
        sources.iter().map(|s| Self::compile(s.as_ref())).collect()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Dotted attribute paths referenced by this template
    pub fn paths(&self) -> impl Iterator<Item = String> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Path(keys) => Some(keys.join(".")),
            Segment::Literal(_) => None,
        })
    }

    /// Render this template against a record
    pub fn resolve(&self, record: &EntityRecord, format: &ValueFormat) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Path(keys) => {
                    if let Some(value) = lookup(record, keys.as_slice()) {
                        out.push_str(&format_value(&value, format));
                    }
                }
            }
        }
        out
    }
}

/// Walk `path` through nested records
///
/// Returns `None` as soon as a key is missing or a non-record value is hit
/// before the end of the path.
pub fn lookup<'r, S: AsRef<str>>(record: &'r EntityRecord, path: &[S]) -> Option<Cow<'r, Value>> {
    let (first, rest) = path.split_first()?;
    rest.iter()
        .try_fold(field(record, first.as_ref())?, |current, key| match current {
            Cow::Borrowed(Value::Record(inner)) => field(inner, key.as_ref()),
            _ => None,
        })
}

/// Look up one key, synthesizing `Name` for people records
fn field<'r>(record: &'r EntityRecord, key: &str) -> Option<Cow<'r, Value>> {
    if let Some(value) = record.get(key) {
        return Some(Cow::Borrowed(value));
    }

    if key.eq_ignore_ascii_case("name") {
        let first = record.get("FirstName")?;
        let last = record.get("LastName")?;
        let format = ValueFormat::default();
        return Some(Cow::Owned(Value::String(format!(
            "{} {}",
            format_value(first, &format),
            format_value(last, &format)
        ))));
    }

    None
}

/// Render a leaf value as display text
pub fn format_value(value: &Value, format: &ValueFormat) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format_date(s, &format.date_format).unwrap_or_else(|| s.clone()),
        Value::List(items) => items
            .iter()
            .map(|item| format_value(item, format))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Record(record) => field(record, "Name")
            .map(|name| format_value(&name, format))
            .unwrap_or_default(),
    }
}

/// Milliseconds since the epoch of a service date string
pub fn service_timestamp(raw: &str) -> Option<i64> {
    SERVICE_DATE.captures(raw)?.get(1)?.as_str().parse().ok()
}

/// Format a service date string (`/Date(1444860000000-0500)/`)
///
/// Returns `None` if `raw` is not a service date or `format` is not a valid
/// strftime string.
pub fn format_date(raw: &str, format: &str) -> Option<String> {
    let caps = SERVICE_DATE.captures(raw)?;
    let millis = service_timestamp(raw)?;

    let offset_secs = match (caps.get(2), caps.get(3)) {
        (Some(hours), minutes) => {
            let sign = if hours.as_str().starts_with('-') { -1 } else { 1 };
            let hours: i32 = hours.as_str()[1..].parse().ok()?;
            let minutes: i32 = minutes.map_or(Some(0), |m| m.as_str().parse().ok())?;
            sign * (hours * 3600 + minutes * 60)
        }
        _ => 0,
    };

    let offset = FixedOffset::east_opt(offset_secs)?;
    let date = DateTime::from_timestamp_millis(millis)?.with_timezone(&offset);

    let mut out = String::new();
    write!(out, "{}", date.format(format)).ok()?;
    Some(out)
}
