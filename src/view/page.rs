use std::fs;
use std::path::PathBuf;

use ramhorns::Template;

use crate::error::{Error, Result};

/// Directory, relative to the blog root, holding the static files.
pub const STATIC_DIR: &str = "static";

/// Reads `<name>.html` templates from one directory. Nothing is cached so edits show up on the next render.
#[derive(Debug, Clone)]
pub struct Templates {
    dir: PathBuf,
}

impl Templates {
    pub fn new(dir: impl Into<PathBuf>) -> Templates {
        Templates { dir: dir.into() }
    }

    pub fn source(&self, name: &str) -> Result<String> {
        let path = self.dir.join(format!("{}.html", name));
        fs::read_to_string(&path).map_err(|e| Error::Template {
            name: name.to_string(),
            message: format!("{}: {}", path.display(), e),
        })
    }
}

pub fn parse_template<'a>(name: &str, src: &'a str) -> Result<Template<'a>> {
    Template::new(src).map_err(|e| Error::Template {
        name: name.to_string(),
        message: format!("{}", e),
    })
}

/// Values every template can use, header and footer included.
#[derive(ramhorns::Content)]
pub struct PageParams<'a> {
    pub blog_title: &'a str,
    pub title: &'a str,
    pub root_path: &'a str,
    pub static_path: String,
}

impl<'a> PageParams<'a> {
    pub fn new(blog_title: &'a str, title: &'a str, root_path: &'a str) -> PageParams<'a> {
        PageParams {
            blog_title,
            title,
            root_path,
            static_path: format!("{}{}/", root_path, STATIC_DIR),
        }
    }
}

/// Surrounds an already rendered body with the header and footer templates.
pub fn wrap_page(templates: &Templates, page: &PageParams, body: &str) -> Result<Vec<u8>> {
    let header_src = templates.source("header")?;
    let header = parse_template("header", &header_src)?;
    let footer_src = templates.source("footer")?;
    let footer = parse_template("footer", &footer_src)?;

    let mut rendered = header.render(page);
    rendered.push_str(body);
    rendered.push_str(&footer.render(page));
    Ok(rendered.into_bytes())
}

pub fn generate_redirect(url: &str) -> String {
    format!(r#"<html><head><meta http-equiv="refresh" content="0;url={}"></head></html>"#, url)
}

/// Absolute link to a post when the blog URL is known, otherwise the relative one.
pub fn permalink(base_url: &str, url: &str) -> String {
    if base_url.is_empty() {
        return url.to_string();
    }

    format!("{}/{}", base_url.trim_end_matches('/'), url)
}
