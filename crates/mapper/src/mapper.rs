//! Per-kind field mapping. Traits are sent as `cv_*` visitor fields,
//! properties as `ce_*` event fields, and the [`Envelope`] is merged on top.

use std::collections::BTreeMap;

use tracing::debug;
use woopra_core::{Event, Identify, MapperResult, Message, Track, WoopraSettings};

use crate::envelope::Envelope;
use crate::nullness::reject_null;
use crate::payload::Payload;
use crate::stringify::{stringify_nested, value_to_string};

pub const VISITOR_PREFIX: &str = "cv_";
pub const EVENT_PREFIX: &str = "ce_";

/// Maps analytics events into Woopra payloads. Stateless; settings are
/// passed per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldMapper;

impl FieldMapper {
    pub fn new() -> Self {
        Self
    }

    pub fn map(&self, event: &Event, settings: &WoopraSettings) -> MapperResult<Payload> {
        match event {
            Event::Identify(identify) => self.identify(identify, settings),
            Event::Track(track) => self.track(track, settings),
        }
    }

    pub fn identify(&self, identify: &Identify, settings: &WoopraSettings) -> MapperResult<Payload> {
        let mut fields = prefix_keys(stringify_nested(identify.traits())?, VISITOR_PREFIX);
        fields.remove("cv_id");

        let company = identify
            .proxy("traits.company")
            .map(value_to_string)
            .transpose()?;

        let mut envelope = Envelope::build(identify, settings)?.into_fields();
        envelope.insert("cv_company".to_string(), company);
        envelope.insert("cv_name".to_string(), identify.name());

        let payload = merge(fields, &envelope);
        debug!(kind = "identify", field_count = payload.len(), "Woopra payload mapped");
        Ok(payload)
    }

    pub fn track(&self, track: &Track, settings: &WoopraSettings) -> MapperResult<Payload> {
        let mut fields = prefix_keys(stringify_nested(track.properties())?, EVENT_PREFIX);
        if let Some(email) = fields.remove("ce_email") {
            fields.insert("cv_email".to_string(), email);
        }
        fields.remove("ce_id");

        let mut envelope = Envelope::build(track, settings)?.into_fields();
        envelope.insert("event".to_string(), Some(track.event().to_string()));

        let payload = merge(fields, &envelope);
        debug!(kind = "track", field_count = payload.len(), "Woopra payload mapped");
        Ok(payload)
    }
}

pub fn prefix_keys(fields: BTreeMap<String, String>, prefix: &str) -> BTreeMap<String, String> {
    fields
        .into_iter()
        .map(|(key, value)| (format!("{prefix}{key}"), value))
        .collect()
}

/// Envelope fields win on collision. Absent envelope fields are dropped
/// first, so they never erase a trait or property.
fn merge(fields: BTreeMap<String, String>, envelope: &BTreeMap<String, Option<String>>) -> Payload {
    let mut merged = fields;
    merged.extend(reject_null(envelope));
    Payload::from(merged)
}
