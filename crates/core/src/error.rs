use thiserror::Error;

pub type MapperResult<T> = Result<T, MapperError>;

#[derive(Error, Debug)]
pub enum MapperError {
    #[error("Missing required setting: {0}")]
    MissingSetting(&'static str),

    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}
