//! Analytics event model: `identify` and `track` messages as sent by
//! client libraries, plus the accessor set the mapper reads them through.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{MapperError, MapperResult};

/// Free-form trait, property or option map.
pub type Fields = Map<String, Value>;

/// Device and request context attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventContext {
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    /// User traits known at the time of a `track` call.
    #[serde(default)]
    pub traits: Fields,
}

/// Establishes or updates a user's trait set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identify {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub anonymous_id: Option<String>,
    #[serde(default)]
    pub traits: Fields,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub context: EventContext,
    #[serde(default)]
    pub options: Fields,
}

/// Records a named user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub anonymous_id: Option<String>,
    pub event: String,
    #[serde(default)]
    pub properties: Fields,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub context: EventContext,
    #[serde(default)]
    pub options: Fields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    Identify(Identify),
    Track(Track),
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Identify(_) => "identify",
            Event::Track(_) => "track",
        }
    }
}

impl From<Identify> for Event {
    fn from(identify: Identify) -> Self {
        Event::Identify(identify)
    }
}

impl From<Track> for Event {
    fn from(track: Track) -> Self {
        Event::Track(track)
    }
}

/// Accessors shared by every message kind.
pub trait Message {
    fn user_id(&self) -> Option<&str>;

    /// Anonymous/session identifier used when no user id is known.
    fn session_id(&self) -> Option<&str>;

    fn traits(&self) -> &Fields;

    fn timestamp(&self) -> DateTime<Utc>;

    fn user_agent(&self) -> Option<&str>;

    fn ip(&self) -> Option<&str>;

    /// Raw per-message options, including destination-specific blocks
    /// such as `Woopra`.
    fn options(&self) -> &Fields;

    /// Top-level map addressed by the first segment of a `proxy` path.
    fn root(&self, name: &str) -> Option<&Fields> {
        match name {
            "traits" => Some(self.traits()),
            "options" => Some(self.options()),
            _ => None,
        }
    }

    fn option(&self, key: &str) -> Option<&Value> {
        self.options().get(key).filter(|v| !v.is_null())
    }

    /// Dotted-path lookup such as `traits.company` or `options.Woopra.cookie`.
    fn proxy(&self, path: &str) -> Option<&Value> {
        let (root, rest) = path.split_once('.')?;
        lookup_path(self.root(root)?, rest)
    }
}

/// Walks `path` (dot separated) through nested objects. JSON `null` is
/// reported as absent.
pub fn lookup_path<'a>(fields: &'a Fields, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = fields.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    (!current.is_null()).then_some(current)
}

impl Message for Identify {
    fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    fn session_id(&self) -> Option<&str> {
        self.anonymous_id.as_deref()
    }

    fn traits(&self) -> &Fields {
        &self.traits
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn user_agent(&self) -> Option<&str> {
        self.context.user_agent.as_deref()
    }

    fn ip(&self) -> Option<&str> {
        self.context.ip.as_deref()
    }

    fn options(&self) -> &Fields {
        &self.options
    }
}

impl Identify {
    /// Display name: the `name` trait, else first and last name joined.
    /// Surrounding whitespace is trimmed.
    pub fn name(&self) -> Option<String> {
        if let Some(name) = self.trait_str("name") {
            return Some(name.to_string());
        }
        let first = self
            .trait_str("firstName")
            .or_else(|| self.trait_str("first_name"));
        let last = self
            .trait_str("lastName")
            .or_else(|| self.trait_str("last_name"));
        match (first, last) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(part), None) | (None, Some(part)) => Some(part.to_string()),
            (None, None) => None,
        }
    }

    fn trait_str(&self, key: &str) -> Option<&str> {
        self.traits
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

impl Message for Track {
    fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    fn session_id(&self) -> Option<&str> {
        self.anonymous_id.as_deref()
    }

    fn traits(&self) -> &Fields {
        &self.context.traits
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn user_agent(&self) -> Option<&str> {
        self.context.user_agent.as_deref()
    }

    fn ip(&self) -> Option<&str> {
        self.context.ip.as_deref()
    }

    fn options(&self) -> &Fields {
        &self.options
    }

    fn root(&self, name: &str) -> Option<&Fields> {
        match name {
            "traits" => Some(self.traits()),
            "options" => Some(self.options()),
            "properties" => Some(&self.properties),
            _ => None,
        }
    }
}

impl Track {
    pub fn properties(&self) -> &Fields {
        &self.properties
    }

    pub fn event(&self) -> &str {
        &self.event
    }
}

/// Parse one event object or an array of them.
pub fn parse_events(input: &str) -> MapperResult<Vec<Event>> {
    let value: Value =
        serde_json::from_str(input).map_err(|e| MapperError::InvalidEvent(e.to_string()))?;
    let items = match value {
        Value::Array(items) => items,
        single => vec![single],
    };
    items
        .into_iter()
        .map(|item| {
            serde_json::from_value(item).map_err(|e| MapperError::InvalidEvent(e.to_string()))
        })
        .collect()
}
