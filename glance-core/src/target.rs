//! Target descriptors: what the caller wants to act on.
//!
//! Parsing is total. Anything that is not a recognisable structured target
//! degrades to free text.
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;

/// Loosely specified element reference.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TargetDescriptor {
    /// Index into the current snapshot; meaningless across snapshots.
    pub id: Option<String>,
    pub target_type: Option<String>,
    pub text: Option<String>,
    pub is_structured: bool,
    /// The input as received, echoed back in not-found messages.
    pub raw: String,
}

impl TargetDescriptor {
    /// Parse a raw target string.
    ///
    /// Accepted forms, tried in order: a JSON object, the same object with
    /// single quotes, a lenient `key: value, ...` object, a report token
    /// `[id][type]text`, and free text.
    ///
    /// ```
    /// use glance_core::TargetDescriptor;
    ///
    /// let t = TargetDescriptor::parse("[3][Button] Submit ");
    /// assert_eq!(t.index(), Some(3));
    /// assert_eq!(t.target_type.as_deref(), Some("button"));
    /// assert_eq!(t.text.as_deref(), Some("submit"));
    ///
    /// let free = TargetDescriptor::parse("Sign in button");
    /// assert!(!free.is_structured);
    /// assert_eq!(free.text.as_deref(), Some("sign in button"));
    /// ```
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with('{') && trimmed.ends_with('}') {
            if let Some(target) = parse_object(trimmed).filter(|t| t.is_structured) {
                return Self {
                    raw: raw.to_string(),
                    ..target
                };
            }
        }

        if let Some(target) = parse_token(trimmed) {
            return Self {
                raw: raw.to_string(),
                ..target
            };
        }

        Self::free_text(raw)
    }

    /// Build a descriptor from an already decoded JSON value.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => {
                let target = from_map(map);
                if target.is_structured {
                    Self {
                        raw: value.to_string(),
                        ..target
                    }
                } else {
                    Self::free_text(&value.to_string())
                }
            }
            Value::String(s) => Self::parse(s),
            Value::Number(n) => Self {
                id: Some(n.to_string()),
                is_structured: true,
                raw: n.to_string(),
                ..Default::default()
            },
            other => Self::free_text(&other.to_string()),
        }
    }

    /// Structured target from parts; empty parts are dropped.
    pub fn structured(id: Option<&str>, target_type: Option<&str>, text: Option<&str>) -> Self {
        let id = id.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        let target_type = normalize_field(target_type);
        let text = normalize_field(text);
        let is_structured = id.is_some() || target_type.is_some() || text.is_some();
        let mut target = Self {
            id,
            target_type,
            text,
            is_structured,
            raw: String::new(),
        };
        target.raw = target.criteria();
        target
    }

    fn free_text(raw: &str) -> Self {
        Self {
            text: normalize_field(Some(raw)),
            raw: raw.to_string(),
            ..Default::default()
        }
    }

    /// The id as a snapshot index, when it is a non-negative integer.
    pub fn index(&self) -> Option<usize> {
        self.id.as_deref()?.trim().parse().ok()
    }

    /// `id=…, type=…, text=…` for structured targets, the quoted raw input
    /// otherwise.
    pub fn criteria(&self) -> String {
        if !self.is_structured {
            return format!("'{}'", self.raw);
        }
        [
            ("id", &self.id),
            ("type", &self.target_type),
            ("text", &self.text),
        ]
        .iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| format!("{key}={v}")))
        .collect::<Vec<_>>()
        .join(", ")
    }
}

impl fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.criteria())
    }
}

fn normalize_field(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn from_map(map: &Map<String, Value>) -> TargetDescriptor {
    let id = map.get("id").and_then(value_text);
    let target_type = map.get("type").and_then(value_text);
    let text = map.get("text").and_then(value_text);
    TargetDescriptor::structured(id.as_deref(), target_type.as_deref(), text.as_deref())
}

fn parse_object(s: &str) -> Option<TargetDescriptor> {
    let decoded = serde_json::from_str::<Value>(s)
        .or_else(|_| serde_json::from_str::<Value>(&s.replace('\'', "\"")));
    match decoded {
        Ok(Value::Object(map)) => Some(from_map(&map)),
        Ok(_) => None,
        Err(_) => Some(parse_lenient(s)),
    }
}

/// `{id: 3, type: button, text: Submit}` without any quoting rules.
fn parse_lenient(s: &str) -> TargetDescriptor {
    let body = s.trim_matches(|c| c == '{' || c == '}').trim();
    let (mut id, mut target_type, mut text) = (None, None, None);
    for part in body.split(',') {
        let Some((key, value)) = part.split_once(':') else {
            continue;
        };
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
        match key.trim().trim_matches(|c| c == '"' || c == '\'').to_lowercase().as_str() {
            "id" => id = Some(value),
            "type" => target_type = Some(value),
            "text" => text = Some(value),
            _ => {}
        }
    }
    TargetDescriptor::structured(id, target_type, text)
}

fn parse_token(s: &str) -> Option<TargetDescriptor> {
    let re = Regex::new(r"^\[(\d+)\]\[(.*?)\](.*)").ok()?;
    let caps = re.captures(s)?;
    Some(TargetDescriptor::structured(
        caps.get(1).map(|m| m.as_str()),
        caps.get(2).map(|m| m.as_str()),
        caps.get(3).map(|m| m.as_str()),
    ))
}

/// Rejections produced while reading an action request.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Error: Invalid JSON input format. Please provide a valid JSON string.")]
    InvalidJson,

    #[error("Error: 'value' field is required in the input JSON.")]
    MissingValue,

    #[error("Error: At least one of 'id', 'type', or 'text' must be provided to identify the element.")]
    MissingTarget,
}

/// A `{"id", "type", "text", "value"}` request as sent by tool callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub target: TargetDescriptor,
    pub value: String,
}

impl ActionRequest {
    /// Split a JSON request into its target and value.
    ///
    /// An id alone, or a type together with text, gives a structured target;
    /// text alone is searched as free text.
    pub fn parse(raw: &str) -> Result<Self, RequestError> {
        let decoded = serde_json::from_str::<Value>(raw)
            .or_else(|_| serde_json::from_str::<Value>(&raw.replace('\'', "\"")))
            .map_err(|_| RequestError::InvalidJson)?;
        let Value::Object(map) = decoded else {
            return Err(RequestError::InvalidJson);
        };

        let field = |key: &str| {
            map.get(key)
                .and_then(value_text)
                .filter(|v| !v.trim().is_empty())
        };
        let value = field("value").ok_or(RequestError::MissingValue)?;
        let (id, target_type, text) = (field("id"), field("type"), field("text"));

        let target = match (&id, &target_type, &text) {
            (Some(_), _, _) | (None, Some(_), Some(_)) => {
                TargetDescriptor::structured(id.as_deref(), target_type.as_deref(), text.as_deref())
            }
            (None, None, Some(text)) => TargetDescriptor::free_text(text),
            _ => return Err(RequestError::MissingTarget),
        };
        Ok(Self { target, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_objects_are_structured() {
        let t = TargetDescriptor::parse(r#"{"id": 5, "type": "Button", "text": "  Submit "}"#);
        assert!(t.is_structured);
        assert_eq!(t.id.as_deref(), Some("5"));
        assert_eq!(t.index(), Some(5));
        assert_eq!(t.target_type.as_deref(), Some("button"));
        assert_eq!(t.text.as_deref(), Some("submit"));
    }

    #[test]
    fn single_quotes_are_repaired() {
        let t = TargetDescriptor::parse("{'type': 'dropdown', 'text': 'Country'}");
        assert_eq!(t.criteria(), "type=dropdown, text=country");
    }

    #[test]
    fn lenient_objects_are_read() {
        let t = TargetDescriptor::parse("{type: link, text: Read more}");
        assert!(t.is_structured);
        assert_eq!(t.target_type.as_deref(), Some("link"));
        assert_eq!(t.text.as_deref(), Some("read more"));
        assert_eq!(t.id, None);
    }

    #[test]
    fn report_tokens_parse() {
        let t = TargetDescriptor::parse("[12][input]Email address");
        assert_eq!(t.index(), Some(12));
        assert_eq!(t.target_type.as_deref(), Some("input"));
        assert_eq!(t.text.as_deref(), Some("email address"));
    }

    #[test]
    fn anything_else_is_free_text() {
        let t = TargetDescriptor::parse("  The BIG red Button ");
        assert!(!t.is_structured);
        assert_eq!(t.text.as_deref(), Some("the big red button"));
        assert_eq!(t.criteria(), "'  The BIG red Button '");

        let empty_object = TargetDescriptor::parse("{\"color\": \"red\"}");
        assert!(!empty_object.is_structured);
        assert_eq!(empty_object.text.as_deref(), Some("{\"color\": \"red\"}"));

        let blank = TargetDescriptor::parse("   ");
        assert_eq!(blank.text, None);
    }

    #[test]
    fn values_decode_like_strings() {
        let t = TargetDescriptor::from_value(&json!({"id": "2"}));
        assert_eq!(t.index(), Some(2));
        assert_eq!(t.criteria(), "id=2");

        let t = TargetDescriptor::from_value(&json!("[0][link]Home"));
        assert_eq!(t.index(), Some(0));

        let t = TargetDescriptor::from_value(&json!(7));
        assert_eq!(t.index(), Some(7));
    }

    #[test]
    fn non_numeric_ids_have_no_index() {
        let t = TargetDescriptor::parse(r#"{"id": "submit-btn"}"#);
        assert!(t.is_structured);
        assert_eq!(t.index(), None);
    }

    #[test]
    fn action_requests_split_target_and_value() {
        let req = ActionRequest::parse(r#"{"type": "input", "text": "Email", "value": "a@b.c"}"#)
            .unwrap();
        assert_eq!(req.value, "a@b.c");
        assert_eq!(req.target.criteria(), "type=input, text=email");

        let req = ActionRequest::parse("{'id': 4, 'value': 'Canada'}").unwrap();
        assert_eq!(req.target.index(), Some(4));

        let req = ActionRequest::parse(r#"{"text": "Search", "value": "rust"}"#).unwrap();
        assert!(!req.target.is_structured);
        assert_eq!(req.target.criteria(), "'Search'");
    }

    #[test]
    fn action_request_errors() {
        assert_eq!(
            ActionRequest::parse("not json"),
            Err(RequestError::InvalidJson)
        );
        assert_eq!(
            ActionRequest::parse(r#"{"id": 1}"#),
            Err(RequestError::MissingValue)
        );
        assert_eq!(
            ActionRequest::parse(r#"{"type": "input", "value": "x"}"#),
            Err(RequestError::MissingTarget)
        );
        assert_eq!(
            RequestError::MissingValue.to_string(),
            "Error: 'value' field is required in the input JSON."
        );
    }
}
