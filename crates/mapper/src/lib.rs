//! Woopra destination support: maps `identify` and `track` events into the
//! flat query-string payload accepted by Woopra's tracking API.
//!
//! # Modules
//!
//! - [`nullness`] — Absent-field elision
//! - [`stringify`] — Nested trait/property values to single strings
//! - [`envelope`] — Fields shared by every event kind (id, cookie, timeout, ...)
//! - [`mapper`] — Per-kind field mapping producing a [`Payload`]
//! - [`payload`] — The flat wire record and its query-string form
//! - [`adaptors`] — Destination adaptors shaping outbound requests

pub mod adaptors;
pub mod envelope;
pub mod mapper;
pub mod nullness;
pub mod payload;
pub mod stringify;

pub use adaptors::woopra::{WoopraAdaptor, WoopraRequest};
pub use adaptors::DestinationAdaptor;
pub use envelope::Envelope;
pub use mapper::FieldMapper;
pub use payload::Payload;
