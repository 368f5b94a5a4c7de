//! Fields computed the same way for every event kind.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;
use woopra_core::{MapperResult, Message, WoopraSettings};

use crate::stringify::scalar_to_string;

/// Idle timeout sent when neither the event nor the settings carry one.
pub const DEFAULT_TIMEOUT_MS: &str = "30000";

/// Per-event cookie override, under the message options.
pub const COOKIE_OVERRIDE_PATH: &str = "options.Woopra.cookie";

/// Shared Woopra fields. Optional fields stay `None` until the merge drops
/// them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub cv_id: Option<String>,
    pub timestamp: String,
    pub timeout: String,
    pub cookie: Option<String>,
    pub lang: Option<String>,
    pub host: String,
    pub ua: Option<String>,
    pub context: String,
    pub ip: Option<String>,
}

impl Envelope {
    pub fn build<M: Message + ?Sized>(message: &M, settings: &WoopraSettings) -> MapperResult<Self> {
        Ok(Self {
            cv_id: message.user_id().map(str::to_string),
            timestamp: epoch_millis(message.timestamp()),
            timeout: resolve_timeout(message, settings),
            cookie: resolve_cookie(message),
            lang: resolve_language(message),
            host: settings.domain.clone(),
            ua: message.user_agent().map(str::to_string),
            context: serde_json::to_string(message.options())?,
            ip: message.ip().map(str::to_string),
        })
    }

    /// Wire keys and values, absent fields included as `None`.
    pub fn into_fields(self) -> BTreeMap<String, Option<String>> {
        BTreeMap::from([
            ("cv_id".to_string(), self.cv_id),
            ("timestamp".to_string(), Some(self.timestamp)),
            ("timeout".to_string(), Some(self.timeout)),
            ("cookie".to_string(), self.cookie),
            ("lang".to_string(), self.lang),
            ("host".to_string(), Some(self.host)),
            ("ua".to_string(), self.ua),
            ("context".to_string(), Some(self.context)),
            ("ip".to_string(), self.ip),
        ])
    }
}

pub fn epoch_millis(timestamp: DateTime<Utc>) -> String {
    timestamp.timestamp_millis().to_string()
}

/// Event option `timeout`, then settings `timeout`, then the default.
/// Empty or zero values count as unset at every step.
pub fn resolve_timeout<M: Message + ?Sized>(message: &M, settings: &WoopraSettings) -> String {
    message
        .option("timeout")
        .and_then(set_scalar)
        .or_else(|| settings.timeout.filter(|ms| *ms > 0).map(|ms| ms.to_string()))
        .unwrap_or_else(|| DEFAULT_TIMEOUT_MS.to_string())
}

/// Explicit override first, otherwise a hash of the user id or session id.
pub fn resolve_cookie<M: Message + ?Sized>(message: &M) -> Option<String> {
    if let Some(cookie) = message
        .proxy(COOKIE_OVERRIDE_PATH)
        .and_then(set_scalar)
    {
        return Some(cookie);
    }
    message
        .user_id()
        .filter(|id| !id.is_empty())
        .or_else(|| message.session_id().filter(|id| !id.is_empty()))
        .map(hash_identity)
}

/// Trait `language`, then option `language`.
pub fn resolve_language<M: Message + ?Sized>(message: &M) -> Option<String> {
    message
        .proxy("traits.language")
        .and_then(set_scalar)
        .or_else(|| message.option("language").and_then(set_scalar))
}

/// Scalar that counts as set in a fallback chain. Empty strings, `0` and
/// `false` fall through to the next source.
fn set_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => scalar_to_string(other).filter(|s| !s.is_empty()),
    }
}

/// Lowercase hex MD5 digest, the cookie format Woopra correlates visitors by.
pub fn hash_identity(id: &str) -> String {
    format!("{:x}", md5::compute(id.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use woopra_core::Identify;

    fn test_identify(overrides: Value) -> Identify {
        let mut base = json!({
            "userId": "u1",
            "anonymousId": "s1",
            "traits": {},
            "timestamp": "2015-06-15T12:30:45.123Z",
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), overrides.as_object()) {
            for (key, value) in extra {
                base.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(base).unwrap()
    }

    #[test]
    fn test_hash_identity_known_values() {
        assert_eq!(hash_identity("u1"), "e4774cdda0793f86414e8b9140bb6db4");
        assert_eq!(hash_identity("s1"), "8ddf878039b70767c4a5bcf4f0c4f65e");
    }

    #[test]
    fn test_build_full_envelope() {
        let identify = test_identify(json!({
            "context": { "userAgent": "Mozilla/5.0", "ip": "10.0.0.1" },
            "options": { "language": "de" },
        }));
        let envelope = Envelope::build(&identify, &WoopraSettings::new("x.com")).unwrap();

        assert_eq!(envelope.cv_id.as_deref(), Some("u1"));
        assert_eq!(envelope.timestamp, "1434371445123");
        assert_eq!(envelope.timeout, "30000");
        assert_eq!(envelope.cookie.as_deref(), Some("e4774cdda0793f86414e8b9140bb6db4"));
        assert_eq!(envelope.lang.as_deref(), Some("de"));
        assert_eq!(envelope.host, "x.com");
        assert_eq!(envelope.ua.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(envelope.context, r#"{"language":"de"}"#);
        assert_eq!(envelope.ip.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_absent_fields_stay_none() {
        let identify = test_identify(json!({ "userId": null, "anonymousId": null }));
        let fields = Envelope::build(&identify, &WoopraSettings::new("x.com"))
            .unwrap()
            .into_fields();

        assert_eq!(fields.len(), 9);
        assert_eq!(fields["cv_id"], None);
        assert_eq!(fields["cookie"], None);
        assert_eq!(fields["ua"], None);
        assert_eq!(fields["ip"], None);
        assert_eq!(fields["lang"], None);
        assert_eq!(fields["context"].as_deref(), Some("{}"));
    }

    #[test]
    fn test_timeout_priority() {
        let settings = WoopraSettings::new("x.com").with_timeout(1200);

        let from_option = test_identify(json!({ "options": { "timeout": 500 } }));
        assert_eq!(resolve_timeout(&from_option, &settings), "500");

        let from_string_option = test_identify(json!({ "options": { "timeout": "750" } }));
        assert_eq!(resolve_timeout(&from_string_option, &settings), "750");

        let plain = test_identify(json!({}));
        assert_eq!(resolve_timeout(&plain, &settings), "1200");
        assert_eq!(resolve_timeout(&plain, &WoopraSettings::new("x.com")), DEFAULT_TIMEOUT_MS);

        let null_option = test_identify(json!({ "options": { "timeout": null } }));
        assert_eq!(resolve_timeout(&null_option, &settings), "1200");
    }

    #[test]
    fn test_timeout_skips_empty_and_zero() {
        let settings = WoopraSettings::new("x.com").with_timeout(1200);

        let empty = test_identify(json!({ "options": { "timeout": "" } }));
        assert_eq!(resolve_timeout(&empty, &settings), "1200");

        let zero = test_identify(json!({ "options": { "timeout": 0 } }));
        assert_eq!(resolve_timeout(&zero, &settings), "1200");

        let zero_settings = WoopraSettings::new("x.com").with_timeout(0);
        assert_eq!(resolve_timeout(&empty, &zero_settings), DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_cookie_priority() {
        let overridden = test_identify(json!({ "options": { "Woopra": { "cookie": "abc" } } }));
        assert_eq!(resolve_cookie(&overridden).as_deref(), Some("abc"));

        let by_user = test_identify(json!({}));
        assert_eq!(resolve_cookie(&by_user), Some(hash_identity("u1")));

        let by_session = test_identify(json!({ "userId": null }));
        assert_eq!(resolve_cookie(&by_session), Some(hash_identity("s1")));

        let empty_user = test_identify(json!({ "userId": "" }));
        assert_eq!(resolve_cookie(&empty_user), Some(hash_identity("s1")));

        let empty_override = test_identify(json!({ "options": { "Woopra": { "cookie": "" } } }));
        assert_eq!(resolve_cookie(&empty_override), Some(hash_identity("u1")));
    }

    #[test]
    fn test_cookie_is_deterministic() {
        let a = resolve_cookie(&test_identify(json!({ "userId": "alice" })));
        let b = resolve_cookie(&test_identify(json!({ "userId": "alice" })));
        let c = resolve_cookie(&test_identify(json!({ "userId": "bob" })));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_language_priority() {
        let both = test_identify(json!({
            "traits": { "language": "en" },
            "options": { "language": "fr" },
        }));
        assert_eq!(resolve_language(&both).as_deref(), Some("en"));

        let option_only = test_identify(json!({ "options": { "language": "fr" } }));
        assert_eq!(resolve_language(&option_only).as_deref(), Some("fr"));

        assert_eq!(resolve_language(&test_identify(json!({}))), None);
    }

    #[test]
    fn test_language_skips_empty_trait() {
        let identify = test_identify(json!({
            "traits": { "language": "" },
            "options": { "language": "fr" },
        }));
        assert_eq!(resolve_language(&identify).as_deref(), Some("fr"));

        let both_empty = test_identify(json!({
            "traits": { "language": "" },
            "options": { "language": "" },
        }));
        assert_eq!(resolve_language(&both_empty), None);
    }

    #[test]
    fn test_context_keeps_nested_options() {
        let identify = test_identify(json!({
            "options": { "Woopra": { "cookie": "abc" } },
        }));
        let envelope = Envelope::build(&identify, &WoopraSettings::new("x.com")).unwrap();
        assert_eq!(envelope.context, r#"{"Woopra":{"cookie":"abc"}}"#);
    }
}
