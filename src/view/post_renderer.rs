use ramhorns::Template;

use crate::error::Result;
use crate::post::Post;
use crate::view::page::{parse_template, PageParams};

#[derive(ramhorns::Content)]
struct ViewItem<'a> {
    blog_title: &'a str,
    title: &'a str,
    root_path: &'a str,
    static_path: &'a str,
    date: &'a str,
    url: &'a str,
    permalink: &'a str,
    content: &'a str,
}

pub struct PostRenderer<'a> {
    pub template: Template<'a>,
}

impl PostRenderer<'_> {
    pub fn new(view_tpl_src: &str) -> Result<PostRenderer<'_>> {
        let template = parse_template("post", view_tpl_src)?;
        Ok(PostRenderer { template })
    }

    /// Renders the post template. `content` is the post body already converted to HTML.
    pub fn render(&self, page: &PageParams, post: &Post, permalink: &str, content: &str) -> String {
        let url = post.create_url();
        self.template.render(&ViewItem {
            blog_title: page.blog_title,
            title: page.title,
            root_path: page.root_path,
            static_path: page.static_path.as_str(),
            date: post.date(),
            url: url.as_str(),
            permalink,
            content,
        })
    }
}
