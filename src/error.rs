use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Could not checksum blog post {}", path.display())]
    Checksum {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error reading blog post {}", path.display())]
    ReadPost {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Blog post {} is not valid UTF-8", path.display())]
    NotUtf8 { path: PathBuf },

    #[error("Error scanning posts directory {}", path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Trying to find directory for {url}, but {segment} is not a directory")]
    NotADirectory { url: String, segment: String },

    #[error("Post {url} collides with existing entry {segment}")]
    Conflict { url: String, segment: String },

    #[error("Post {url} has a relative path segment {segment}")]
    RelativeSegment { url: String, segment: String },

    #[error("Error writing {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error loading template {name}: {message}")]
    Template { name: String, message: String },

    #[error("Error rendering markdown for {}: {reason}", path.display())]
    Markdown { path: PathBuf, reason: String },

    #[error("Error generating feed")]
    Feed(#[from] quick_xml::Error),

    #[error("Error opening configuration file {}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error parsing configuration file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported configuration version {0}")]
    UnsupportedVersion(u32),

    #[error("PollInterval in {} must be at least one second", path.display())]
    ZeroPollInterval { path: PathBuf },

    #[error("Refreshing posts did not finish")]
    RefreshAborted(#[source] tokio::task::JoinError),

    #[error("Error running server on {address}")]
    Server {
        address: String,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
