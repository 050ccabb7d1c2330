use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::post::Post;
use crate::view::list_renderer::ListRenderer;
use crate::view::page::{permalink, wrap_page, PageParams, Templates};
use crate::view::post_renderer::PostRenderer;
use crate::view::rss_renderer::{FeedItem, RssChannel};

const INDEX_TITLE: &str = "Posts";

/// Produces the bytes for every kind of page the blog serves or writes.
/// `posts` slices are always sorted in ascending order.
pub trait SiteRenderer {
    fn render_post(&self, post: &Post, root_path: &str) -> Result<Vec<u8>>;
    fn render_index(&self, posts: &[Arc<Post>], root_path: &str) -> Result<Vec<u8>>;
    fn render_feed(&self, posts: &[Arc<Post>]) -> Result<Vec<u8>>;
}

pub struct TemplateRenderer {
    config: Arc<Config>,
    templates: Templates,
}

impl TemplateRenderer {
    pub fn new(config: Arc<Config>) -> TemplateRenderer {
        let templates = Templates::new(&config.templates_dir);
        TemplateRenderer { config, templates }
    }

    fn render_markdown(&self, post: &Post) -> Result<String> {
        let body = post.contents()?;
        let options = self.config.markdown_options();
        markdown::to_html_with_options(&body, &options).map_err(|e| Error::Markdown {
            path: post.path().to_path_buf(),
            reason: e.reason,
        })
    }
}

impl SiteRenderer for TemplateRenderer {
    fn render_post(&self, post: &Post, root_path: &str) -> Result<Vec<u8>> {
        let content = self.render_markdown(post)?;
        let page = PageParams::new(&self.config.title, post.title(), root_path);
        let link = permalink(&self.config.url, &post.create_url());

        let post_src = self.templates.source("post")?;
        let renderer = PostRenderer::new(&post_src)?;
        let body = renderer.render(&page, post, &link, &content);
        wrap_page(&self.templates, &page, &body)
    }

    fn render_index(&self, posts: &[Arc<Post>], root_path: &str) -> Result<Vec<u8>> {
        let page = PageParams::new(&self.config.title, INDEX_TITLE, root_path);

        let list_src = self.templates.source("index")?;
        let renderer = ListRenderer::new(&list_src)?;
        let body = renderer.render(&page, &self.config.url, posts);
        wrap_page(&self.templates, &page, &body)
    }

    fn render_feed(&self, posts: &[Arc<Post>]) -> Result<Vec<u8>> {
        let mut items = Vec::with_capacity(posts.len());
        for post in posts.iter().rev() {
            items.push(FeedItem {
                post,
                rendered: self.render_markdown(post)?,
            });
        }

        let rss = RssChannel {
            ch_title: &self.config.title,
            ch_link: &self.config.url,
            ch_desc: &self.config.description,
        };
        Ok(rss.render(&items)?)
    }
}
