//! Destination adaptors. An adaptor owns the settings for one destination,
//! turns `identify`/`track` events into that destination's flat [`Payload`],
//! and checks its settings before anything is mapped.

pub mod woopra;

use woopra_core::{Event, MapperResult};

use crate::payload::Payload;

pub trait DestinationAdaptor: Send + Sync {
    /// Display name of the destination, e.g. "Woopra".
    fn platform(&self) -> &str;

    fn transform(&self, event: &Event) -> MapperResult<Payload>;

    /// Maps every event in order. The first mapping error aborts the batch,
    /// so no partial batch is returned.
    fn transform_batch(&self, events: &[Event]) -> MapperResult<Vec<Payload>> {
        events.iter().map(|e| self.transform(e)).collect()
    }

    /// Fails with `MissingSetting` when a required setting is absent.
    fn validate_config(&self) -> MapperResult<()>;
}
