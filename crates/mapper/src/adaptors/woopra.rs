//! Woopra adaptor: maps events with [`FieldMapper`] and shapes the GET
//! request Woopra's HTTP tracking API expects. Sending it is up to the caller.

use std::collections::BTreeMap;

use tracing::debug;
use url::Url;
use woopra_core::{Event, MapperResult, WoopraSettings};

use super::DestinationAdaptor;
use crate::mapper::FieldMapper;
use crate::payload::Payload;

pub const WOOPRA_ENDPOINT: &str = "http://www.woopra.com/track";
pub const WOOPRA_CHANNELS: &[&str] = &["server"];

/// A fully shaped outbound Woopra hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WoopraRequest {
    pub method: &'static str,
    pub url: Url,
    pub headers: BTreeMap<String, String>,
}

impl WoopraRequest {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "method": self.method,
            "url": self.url.as_str(),
            "headers": self.headers,
        })
    }
}

pub struct WoopraAdaptor {
    settings: WoopraSettings,
    mapper: FieldMapper,
}

impl WoopraAdaptor {
    pub fn new(settings: WoopraSettings) -> Self {
        Self {
            settings,
            mapper: FieldMapper::new(),
        }
    }

    pub fn settings(&self) -> &WoopraSettings {
        &self.settings
    }

    pub fn channels(&self) -> &'static [&'static str] {
        WOOPRA_CHANNELS
    }

    /// Map `event` and build the request for it. Identify hits carry the
    /// user agent as a header and send neither `ua` nor `lang` as query
    /// parameters.
    pub fn request(&self, event: &Event) -> MapperResult<WoopraRequest> {
        let mut payload = self.transform(event)?;
        let mut headers = BTreeMap::new();

        let path = match event {
            Event::Identify(_) => {
                if let Some(ua) = payload.remove("ua") {
                    headers.insert("User-Agent".to_string(), ua);
                }
                payload.remove("lang");
                "identify/"
            }
            Event::Track(_) => "ce/",
        };

        let mut url = Url::parse(&format!("{WOOPRA_ENDPOINT}/"))?.join(path)?;
        url.set_query(Some(&payload.to_query_string()));

        debug!(path, field_count = payload.len(), "Woopra request shaped");

        Ok(WoopraRequest {
            method: "GET",
            url,
            headers,
        })
    }
}

impl DestinationAdaptor for WoopraAdaptor {
    fn platform(&self) -> &str {
        "Woopra"
    }

    fn transform(&self, event: &Event) -> MapperResult<Payload> {
        self.mapper.map(event, &self.settings)
    }

    fn validate_config(&self) -> MapperResult<()> {
        self.settings.validate()
    }
}
