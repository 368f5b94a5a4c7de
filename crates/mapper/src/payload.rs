//! The flat wire record handed to the transport.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Ordered, string-valued Woopra payload. Keys are case-sensitive and part
/// of the external contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(BTreeMap<String, String>);

impl Payload {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    /// `application/x-www-form-urlencoded` rendering, keys in sorted order.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

impl From<BTreeMap<String, String>> for Payload {
    fn from(fields: BTreeMap<String, String>) -> Self {
        Self(fields)
    }
}

impl<'a> IntoIterator for &'a Payload {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_payload() -> Payload {
        Payload::from(BTreeMap::from([
            ("host".to_string(), "x.com".to_string()),
            ("ce_note".to_string(), "a b&c=d".to_string()),
            ("context".to_string(), "{}".to_string()),
        ]))
    }

    #[test]
    fn test_query_string_is_sorted_and_encoded() {
        assert_eq!(
            test_payload().to_query_string(),
            "ce_note=a+b%26c%3Dd&context=%7B%7D&host=x.com"
        );
    }

    #[test]
    fn test_accessors() {
        let mut payload = test_payload();
        assert_eq!(payload.get("host"), Some("x.com"));
        assert!(payload.contains_key("context"));
        assert_eq!(payload.remove("context"), Some("{}".to_string()));
        assert_eq!(payload.len(), 2);
        assert!(!payload.is_empty());
    }

    #[test]
    fn test_serializes_as_flat_object() {
        let json = serde_json::to_value(test_payload()).unwrap();
        assert_eq!(json["host"], "x.com");
        assert_eq!(json.as_object().unwrap().len(), 3);
    }
}
