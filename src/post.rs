use std::fmt;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::text_utils::{parse_date, slugify};

const METADATA_MARKER: &str = "~~";

pub type Checksum = [u8; 32];

/// Front-matter of a post. Empty strings mean the key was not present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub title: String,
    pub url: String,
    pub date: String,
}

impl Metadata {
    fn apply_line(&mut self, line: &str) {
        let Some((key, value)) = line.split_once(':') else {
            return;
        };

        let value = value.trim().to_string();
        match key.trim().to_lowercase().as_str() {
            "title" => self.title = value,
            "url" => self.url = value,
            "date" => self.date = value,
            _ => {}
        }
    }
}

#[derive(PartialEq, Eq, Copy, Clone)]
enum ParseMode {
    Lazily,
    ReloadMetadata,
    Contents,
}

/// Example of post
/// ~~ Title: Hello World
/// ~~ Date: 1 April 2012
/// ~~ URL: hello
///
/// Hi there.
#[derive(Debug, Clone)]
pub struct Post {
    path: PathBuf,
    metadata: Metadata,
    date: Option<NaiveDate>,
    checksum: Checksum,
}

impl Display for Post {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "file={}, title={}, url={}, date={}",
               self.path.display(),
               self.metadata.title,
               self.metadata.url,
               self.metadata.date,
        )
    }
}

impl Post {
    pub fn load(path: impl Into<PathBuf>) -> Result<Post> {
        let path = path.into();
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(source) => return Err(Error::Checksum { path, source }),
        };

        let (metadata, _) = split_post(&bytes);
        let date = parse_date(&metadata.date);
        Ok(Post {
            checksum: checksum(&bytes),
            path,
            metadata,
            date,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    pub fn url_fragment(&self) -> &str {
        &self.metadata.url
    }

    /// The date exactly as written in the post.
    pub fn date(&self) -> &str {
        &self.metadata.date
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn checksum(&self) -> &Checksum {
        &self.checksum
    }

    /// Reloads the metadata only when the file changed. Returns whether anything was reparsed.
    pub fn refresh(&mut self) -> Result<bool> {
        let old = self.checksum;
        self.update(ParseMode::Lazily)?;
        Ok(old != self.checksum)
    }

    pub fn reload_metadata(&mut self) -> Result<()> {
        self.update(ParseMode::ReloadMetadata)?;
        Ok(())
    }

    /// Reloads the metadata and returns the body following it.
    pub fn reload_with_contents(&mut self) -> Result<String> {
        let body = self.update(ParseMode::Contents)?;
        Ok(body.unwrap_or_default())
    }

    /// Reads the body without touching the loaded metadata.
    pub fn contents(&self) -> Result<String> {
        let bytes = self.read()?;
        let (_, body) = split_post(&bytes);
        self.body_to_string(body)
    }

    pub fn is_up_to_date(&self) -> bool {
        match fs::read(&self.path) {
            Ok(bytes) => checksum(&bytes) == self.checksum,
            Err(_) => false,
        }
    }

    /// Relative URL of the rendered post, e.g. `2012/4/hello_world.html`.
    pub fn create_url(&self) -> String {
        let slug = if !self.metadata.url.is_empty() {
            self.metadata.url.clone()
        } else if !self.metadata.title.is_empty() {
            slugify(&self.metadata.title)
        } else {
            self.path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        };

        let mut slug = slug.to_lowercase();
        if slug.ends_with('_') {
            slug.pop();
        } else if slug.ends_with('/') {
            slug.push_str("index");
        }

        let leaf = format!("{}.html", slug);
        match self.date {
            Some(date) => format!("{}/{}/{}", date.year(), date.month(), leaf),
            None => leaf,
        }
    }

    fn update(&mut self, mode: ParseMode) -> Result<Option<String>> {
        let bytes = self.read()?;
        let checksum = checksum(&bytes);
        if mode == ParseMode::Lazily && checksum == self.checksum {
            return Ok(None);
        }

        let (metadata, body) = split_post(&bytes);
        let body = match mode {
            ParseMode::Contents => Some(self.body_to_string(body)?),
            _ => None,
        };

        self.checksum = checksum;
        self.date = parse_date(&metadata.date);
        self.metadata = metadata;
        Ok(body)
    }

    fn read(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).map_err(|source| Error::ReadPost {
            path: self.path.clone(),
            source,
        })
    }

    fn body_to_string(&self, body: &[u8]) -> Result<String> {
        String::from_utf8(body.to_vec()).map_err(|_| Error::NotUtf8 {
            path: self.path.clone(),
        })
    }

    #[cfg(test)]
    pub(crate) fn from_metadata(path: impl Into<PathBuf>, metadata: Metadata) -> Post {
        let date = parse_date(&metadata.date);
        Post {
            path: path.into(),
            metadata,
            date,
            checksum: [0; 32],
        }
    }
}

fn checksum(bytes: &[u8]) -> Checksum {
    Sha256::digest(bytes).into()
}

/// Splits the raw file into its metadata and the remaining body bytes.
fn split_post(bytes: &[u8]) -> (Metadata, &[u8]) {
    let mut metadata = Metadata::default();
    let mut rest = bytes;

    while !rest.is_empty() {
        let line_end = rest.iter()
            .position(|&b| b == b'\n')
            .map_or(rest.len(), |pos| pos + 1);
        let line = &rest[..line_end];
        if !line.starts_with(METADATA_MARKER.as_bytes()) {
            break;
        }

        metadata.apply_line(&String::from_utf8_lossy(&line[METADATA_MARKER.len()..]));
        rest = &rest[line_end..];
    }

    (metadata, rest)
}
