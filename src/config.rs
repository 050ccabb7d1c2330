use std::fs;
use std::path::{Path, PathBuf};

use markdown::Options;
use serde::Deserialize;

use crate::error::{Error, Result};

pub const CONFIG_FILE_NAME: &str = "blackblog.json";
const CONFIG_VERSION: u32 = 1;

#[derive(Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarkdownExtension {
    ExtensionTables,
    ExtensionAutolink,
    ExtensionStrikethrough,
    ExtensionFootnotes,
    ExtensionTaskLists,
    ExtensionMath,
    ExtensionNoIndentedCode,
}

impl MarkdownExtension {
    fn apply(self, options: &mut Options) {
        let constructs = &mut options.parse.constructs;
        match self {
            MarkdownExtension::ExtensionTables => constructs.gfm_table = true,
            MarkdownExtension::ExtensionAutolink => constructs.gfm_autolink_literal = true,
            MarkdownExtension::ExtensionStrikethrough => constructs.gfm_strikethrough = true,
            MarkdownExtension::ExtensionFootnotes => {
                constructs.gfm_footnote_definition = true;
                constructs.gfm_label_start_footnote = true;
            }
            MarkdownExtension::ExtensionTaskLists => constructs.gfm_task_list_item = true,
            MarkdownExtension::ExtensionMath => {
                constructs.math_flow = true;
                constructs.math_text = true;
            }
            MarkdownExtension::ExtensionNoIndentedCode => constructs.code_indented = false,
        }
    }
}

#[derive(Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarkdownHtmlOption {
    HtmlSkipHtml,
    HtmlRawHtml,
    HtmlUnsafeLinks,
    HtmlTagFilter,
}

impl MarkdownHtmlOption {
    fn apply(self, options: &mut Options) {
        match self {
            MarkdownHtmlOption::HtmlSkipHtml => {
                options.parse.constructs.html_flow = false;
                options.parse.constructs.html_text = false;
            }
            MarkdownHtmlOption::HtmlRawHtml => options.compile.allow_dangerous_html = true,
            MarkdownHtmlOption::HtmlUnsafeLinks => options.compile.allow_dangerous_protocol = true,
            MarkdownHtmlOption::HtmlTagFilter => options.compile.gfm_tagfilter = true,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct LogConfig {
    pub level: LogLevel,
    #[serde(default)]
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
    /// Rotated log files to keep, one per day
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

#[derive(Deserialize, Debug, Copy, Clone)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub title: String,
    /// Absolute base URL of the published blog. Links stay relative when empty.
    #[serde(rename = "URL", default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    pub posts_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub static_files_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Seconds between checks for changed posts in server mode
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
    #[serde(default = "default_feed")]
    pub feed: bool,
    #[serde(default)]
    pub markdown_extensions: Vec<MarkdownExtension>,
    #[serde(rename = "MarkdownHTMLOptions", default = "default_html_options")]
    pub markdown_html_options: Vec<MarkdownHtmlOption>,
    pub log: Option<LogConfig>,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_poll_interval() -> u64 {
    60
}

fn default_feed() -> bool {
    true
}

fn default_max_log_files() -> usize {
    30
}

fn default_html_options() -> Vec<MarkdownHtmlOption> {
    vec![MarkdownHtmlOption::HtmlRawHtml]
}

impl Config {
    /// Parses a configuration, resolving relative directories against the folder of `cfg_path`.
    pub fn from_json(content: &str, cfg_path: &Path) -> Result<Config> {
        let mut cfg: Config = match serde_json::from_str(content) {
            Ok(cfg) => cfg,
            Err(source) => return Err(Error::ConfigParse { path: cfg_path.to_path_buf(), source }),
        };

        if cfg.version != CONFIG_VERSION {
            return Err(Error::UnsupportedVersion(cfg.version));
        }

        if cfg.poll_interval == 0 {
            return Err(Error::ZeroPollInterval { path: cfg_path.to_path_buf() });
        }

        let base_dir = cfg_path.parent().unwrap_or(Path::new(""));
        cfg.posts_dir = base_dir.join(&cfg.posts_dir);
        cfg.templates_dir = base_dir.join(&cfg.templates_dir);
        cfg.output_dir = base_dir.join(&cfg.output_dir);
        cfg.static_files_dir = cfg.static_files_dir
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(|dir| base_dir.join(dir));

        Ok(cfg)
    }

    /// Markdown options for the configured extensions and HTML flags.
    pub fn markdown_options(&self) -> Options {
        let mut options = Options::default();
        for extension in self.markdown_extensions.iter() {
            extension.apply(&mut options);
        }
        for html_option in self.markdown_html_options.iter() {
            html_option.apply(&mut options);
        }
        options
    }
}

/// Reads `blackblog.json`. `path` is either the file itself or the directory holding it.
pub fn read_blog(path: &Path) -> Result<Config> {
    let cfg_path = if path.ends_with(CONFIG_FILE_NAME) {
        path.to_path_buf()
    } else {
        path.join(CONFIG_FILE_NAME)
    };

    let cfg_content = match fs::read_to_string(&cfg_path) {
        Ok(content) => content,
        Err(source) => return Err(Error::ConfigRead { path: cfg_path, source }),
    };

    Config::from_json(&cfg_content, &cfg_path)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const MINIMAL: &str = r#"{
        "Title": "My Blog",
        "PostsDir": "posts",
        "TemplatesDir": "templates",
        "OutputDir": "/var/www/blog"
    }"#;

    #[test]
    fn test_defaults() {
        let cfg = Config::from_json(MINIMAL, Path::new("/home/me/blog/blackblog.json")).unwrap();
        assert_eq!(cfg.title, "My Blog");
        assert_eq!(cfg.url, "");
        assert_eq!(cfg.posts_dir, PathBuf::from("/home/me/blog/posts"));
        assert_eq!(cfg.templates_dir, PathBuf::from("/home/me/blog/templates"));
        assert_eq!(cfg.output_dir, PathBuf::from("/var/www/blog"));
        assert_eq!(cfg.static_files_dir, None);
        assert_eq!(cfg.address, "0.0.0.0");
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.poll_interval, 60);
        assert!(cfg.feed);
        assert!(cfg.markdown_extensions.is_empty());
        assert_eq!(cfg.markdown_html_options, vec![MarkdownHtmlOption::HtmlRawHtml]);
        assert!(cfg.log.is_none());

        let options = cfg.markdown_options();
        assert!(options.compile.allow_dangerous_html);
        assert!(!options.parse.constructs.gfm_table);
    }

    #[test]
    fn test_full_config() {
        let json = r#"{
            "Version": 1,
            "Title": "My Blog",
            "URL": "https://blog.example.com/",
            "Description": "Things I wrote",
            "PostsDir": "posts",
            "TemplatesDir": "templates",
            "StaticFilesDir": "static",
            "OutputDir": "out",
            "Port": 9000,
            "PollInterval": 5,
            "Feed": false,
            "MarkdownExtensions": ["EXTENSION_TABLES", "EXTENSION_FOOTNOTES", "EXTENSION_NO_INDENTED_CODE"],
            "MarkdownHTMLOptions": ["HTML_SKIP_HTML"],
            "Log": { "Level": "Debug", "LogToConsole": true }
        }"#;

        let cfg = Config::from_json(json, Path::new("blog/blackblog.json")).unwrap();
        assert_eq!(cfg.url, "https://blog.example.com/");
        assert_eq!(cfg.static_files_dir, Some(PathBuf::from("blog/static")));
        assert_eq!(cfg.output_dir, PathBuf::from("blog/out"));
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.poll_interval, 5);
        assert!(!cfg.feed);
        assert!(matches!(cfg.log, Some(LogConfig { level: LogLevel::Debug, log_to_console: true, location: None, max_files: 30 })));

        let options = cfg.markdown_options();
        assert!(options.parse.constructs.gfm_table);
        assert!(options.parse.constructs.gfm_footnote_definition);
        assert!(!options.parse.constructs.code_indented);
        assert!(!options.parse.constructs.html_flow);
        assert!(!options.compile.allow_dangerous_html);
    }

    #[test]
    fn test_unknown_flag() {
        let json = r#"{
            "Title": "My Blog",
            "PostsDir": "posts",
            "TemplatesDir": "templates",
            "OutputDir": "out",
            "MarkdownExtensions": ["EXTENSION_TABLES", "EXTENSION_BOGUS"]
        }"#;

        let err = Config::from_json(json, Path::new("blackblog.json")).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
        assert!(err.to_string().contains("EXTENSION_BOGUS"));
    }

    #[test]
    fn test_unsupported_version() {
        let json = MINIMAL.replacen('{', r#"{ "Version": 2,"#, 1);
        let err = Config::from_json(&json, Path::new("blackblog.json")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedVersion(2)));
    }

    #[test]
    fn test_zero_poll_interval() {
        let json = MINIMAL.replacen('{', r#"{ "PollInterval": 0,"#, 1);
        let err = Config::from_json(&json, Path::new("blackblog.json")).unwrap_err();
        assert!(matches!(err, Error::ZeroPollInterval { .. }));
    }

    #[test]
    fn test_read_blog() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), MINIMAL).unwrap();

        let from_dir = read_blog(dir.path()).unwrap();
        let from_file = read_blog(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(from_dir.posts_dir, dir.path().join("posts"));
        assert_eq!(from_file.posts_dir, from_dir.posts_dir);

        let err = read_blog(&dir.path().join("elsewhere")).unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }
}
