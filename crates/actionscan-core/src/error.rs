use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("content fetch failed with HTTP {status} for {url}")]
    ContentFetch { status: u16, url: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Base64(#[from] base64::DecodeError),

    #[error("content is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScanError>;
