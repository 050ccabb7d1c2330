use std::sync::Arc;

use ramhorns::Template;

use crate::error::Result;
use crate::post::Post;
use crate::view::page::{parse_template, permalink, PageParams};

#[derive(ramhorns::Content)]
struct ListPage<'a> {
    blog_title: &'a str,
    title: &'a str,
    root_path: &'a str,
    static_path: &'a str,
    posts: Vec<PostItem<'a>>,
    has_posts: bool,
}

#[derive(ramhorns::Content)]
struct PostItem<'a> {
    title: &'a str,
    date: &'a str,
    url: String,
    permalink: String,
}

pub struct ListRenderer<'a> {
    pub template: Template<'a>,
}

impl ListRenderer<'_> {
    pub fn new(list_tpl_src: &str) -> Result<ListRenderer<'_>> {
        let template = parse_template("index", list_tpl_src)?;
        Ok(ListRenderer { template })
    }

    /// Lists `posts` in the order given, which is the ascending post order.
    pub fn render(&self, page: &PageParams, base_url: &str, posts: &[Arc<Post>]) -> String {
        let mut post_list = Vec::with_capacity(posts.len());
        for post in posts {
            let url = post.create_url();
            post_list.push(PostItem {
                title: post.title(),
                date: post.date(),
                permalink: permalink(base_url, &url),
                url: format!("{}{}", page.root_path, url),
            });
        }

        self.template.render(&ListPage {
            blog_title: page.blog_title,
            title: page.title,
            root_path: page.root_path,
            static_path: page.static_path.as_str(),
            has_posts: !post_list.is_empty(),
            posts: post_list,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::post::Metadata;

    use super::*;

    fn post(title: &str, date: &str) -> Arc<Post> {
        Arc::new(Post::from_metadata("post.md", Metadata {
            title: title.to_string(),
            date: date.to_string(),
            ..Metadata::default()
        }))
    }

    #[test]
    fn test_render() {
        let posts = vec![post("Older", "2011-02-07"), post("Newer", "2012-01-06")];
        let renderer = ListRenderer::new("<h1>{{title}}</h1>{{#posts}}<a href=\"{{{url}}}\">{{title}}</a> {{date}};{{/posts}}").unwrap();
        let page = PageParams::new("Blog", "Posts", "");

        let rendered = renderer.render(&page, "", &posts);
        assert_eq!(rendered, "<h1>Posts</h1><a href=\"2011/2/older.html\">Older</a> 2011-02-07;<a href=\"2012/1/newer.html\">Newer</a> 2012-01-06;");
    }

    #[test]
    fn test_render_empty() {
        let renderer = ListRenderer::new("{{^has_posts}}Nothing yet{{/has_posts}}").unwrap();
        let page = PageParams::new("Blog", "Posts", "");
        assert_eq!(renderer.render(&page, "", &[]), "Nothing yet");
    }
}
