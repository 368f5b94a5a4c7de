pub mod config;
pub mod error;
pub mod types;

pub use config::WoopraSettings;
pub use error::{MapperError, MapperResult};
pub use types::{lookup_path, parse_events, Event, EventContext, Fields, Identify, Message, Track};
