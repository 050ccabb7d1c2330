use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use spdlog::{debug, info};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::post_list::PostList;
use crate::render::SiteRenderer;
use crate::render_tree::{Directory, RenderNode, RenderTree, INDEX_FILE};
use crate::view::page::{generate_redirect, STATIC_DIR};

/// Generates the whole blog under `output_dir`. Returns the number of posts written.
pub fn write_static_blog<R: SiteRenderer>(config: &Config, renderer: &R, output_dir: &Path) -> Result<usize> {
    let mut posts = PostList::scan(&config.posts_dir)?;
    posts.sort();
    info!("Found {} posts in {}", posts.len(), config.posts_dir.display());

    let tree = RenderTree::build(posts.as_slice(), config.feed)?;
    fs::create_dir_all(output_dir).map_err(|source| Error::Write {
        path: output_dir.to_path_buf(),
        source,
    })?;

    flush(&tree, output_dir, renderer)?;

    let index = renderer.render_index(posts.as_slice(), "")?;
    write_file(&output_dir.join(INDEX_FILE), &index)?;

    if let Some(ref static_dir) = config.static_files_dir {
        copy_dir(static_dir, &output_dir.join(STATIC_DIR))?;
    }

    info!("Blog written to {}", output_dir.display());
    Ok(posts.len())
}

/// Writes every node of `tree` below `dest`. Stops at the first error and leaves what was written.
pub fn flush<R: SiteRenderer>(tree: &RenderTree, dest: &Path, renderer: &R) -> Result<()> {
    flush_dir(tree.root(), dest, renderer)
}

fn flush_dir<R: SiteRenderer>(dir: &Directory, dest: &Path, renderer: &R) -> Result<()> {
    for (name, node) in dir.children() {
        let path = dest.join(name);
        match node {
            RenderNode::Directory(child) => {
                create_dir(&path)?;
                flush_dir(child, &path, renderer)?;
            }
            RenderNode::Post(post) => {
                let page = renderer.render_post(post, &dir.root_path())?;
                write_file(&path, &page)?;
                debug!("Wrote post {} to {}", post, path.display());
            }
            RenderNode::Redirect(target) => write_file(&path, generate_redirect(target).as_bytes())?,
            RenderNode::Feed(posts) => write_file(&path, &renderer.render_feed(posts)?)?,
        }
    }

    Ok(())
}

fn create_dir(path: &Path) -> Result<()> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
        Err(source) => Err(Error::Write { path: path.to_path_buf(), source }),
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Recursively copies `src` into `dest`. File permissions come along with the contents.
pub fn copy_dir(src: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|source| Error::Scan {
            path: src.to_path_buf(),
            source,
        })?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };

        let target = dest.join(relative);
        let copied = if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
        } else {
            fs::copy(entry.path(), &target).map(|_| ())
        };
        copied.map_err(|source| Error::Write { path: target, source })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::sync::Arc;

    use tempfile::TempDir;

    use crate::post::{Metadata, Post};
    use crate::render::tests::{test_config, write_templates};
    use crate::render::TemplateRenderer;

    use super::*;

    /// Renders each page as a one-line description so tests need no templates.
    struct StubRenderer;

    impl SiteRenderer for StubRenderer {
        fn render_post(&self, post: &Post, root_path: &str) -> Result<Vec<u8>> {
            Ok(format!("post {} root={}", post.create_url(), root_path).into_bytes())
        }

        fn render_index(&self, posts: &[Arc<Post>], _root_path: &str) -> Result<Vec<u8>> {
            Ok(format!("index of {}", posts.len()).into_bytes())
        }

        fn render_feed(&self, posts: &[Arc<Post>]) -> Result<Vec<u8>> {
            Ok(format!("feed of {}", posts.len()).into_bytes())
        }
    }

    fn post(name: &str, date: &str) -> Arc<Post> {
        Arc::new(Post::from_metadata(format!("{}.md", name), Metadata {
            date: date.to_string(),
            ..Metadata::default()
        }))
    }

    fn read_tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
        WalkDir::new(root).into_iter()
            .map(|e| e.unwrap())
            .filter(|e| e.file_type().is_file())
            .map(|e| (e.path().strip_prefix(root).unwrap().to_path_buf(), fs::read(e.path()).unwrap()))
            .collect()
    }

    #[test]
    fn test_flush_layout() {
        let posts = vec![post("hello", "1 April 2012"), post("about", "")];
        let tree = RenderTree::build(&posts, true).unwrap();
        let dir = TempDir::new().unwrap();

        flush(&tree, dir.path(), &StubRenderer).unwrap();

        let files = read_tree(dir.path());
        let read = |p: &str| String::from_utf8(files[&PathBuf::from(p)].clone()).unwrap();
        assert_eq!(files.len(), 5);
        assert_eq!(read("2012/4/hello.html"), "post 2012/4/hello.html root=../../");
        assert_eq!(read("about.html"), "post about.html root=");
        assert_eq!(read("feed.xml"), "feed of 2");
        assert_eq!(read("2012/index.html"), generate_redirect("../"));
        assert_eq!(read("2012/4/index.html"), generate_redirect("../../"));
    }

    #[test]
    fn test_flush_idempotent() {
        let posts = vec![post("one", "2012-04-01"), post("two", "2013-05-02"), post("three", "")];
        let tree = RenderTree::build(&posts, true).unwrap();
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();

        flush(&tree, first.path(), &StubRenderer).unwrap();
        flush(&tree, second.path(), &StubRenderer).unwrap();
        // Flushing over existing output tolerates the directories already being there
        flush(&tree, second.path(), &StubRenderer).unwrap();

        assert_eq!(read_tree(first.path()), read_tree(second.path()));
    }

    #[test]
    fn test_flush_write_error() {
        let tree = RenderTree::build(&[post("hello", "2012-04-01")], false).unwrap();
        let dir = TempDir::new().unwrap();
        // A file where the year directory should go
        fs::write(dir.path().join("2012"), "in the way").unwrap();

        let err = flush(&tree, dir.path(), &StubRenderer).unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
    }

    #[test]
    fn test_write_stays_inside_output() {
        let dir = TempDir::new().unwrap();
        let config = test_config(dir.path());
        write_templates(&config.templates_dir);
        fs::create_dir_all(&config.posts_dir).unwrap();
        fs::write(config.posts_dir.join("escape.md"), "~~ URL: ../escaped\nBoo.\n").unwrap();

        let config = Arc::new(config);
        let renderer = TemplateRenderer::new(config.clone());
        let err = write_static_blog(&config, &renderer, &config.output_dir).unwrap_err();
        assert!(matches!(err, Error::RelativeSegment { .. }));
        assert!(!dir.path().join("escaped.html").exists());
        assert!(!dir.path().join(INDEX_FILE).exists());
    }

    #[test]
    fn test_copy_dir() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("static");
        fs::create_dir_all(src.join("css")).unwrap();
        fs::write(src.join("css/style.css"), "body {}").unwrap();
        fs::write(src.join("favicon.ico"), [0u8, 1, 2]).unwrap();

        let dest = dir.path().join("out/static");
        copy_dir(&src, &dest).unwrap();
        assert_eq!(fs::read_to_string(dest.join("css/style.css")).unwrap(), "body {}");
        assert_eq!(fs::read(dest.join("favicon.ico")).unwrap(), vec![0u8, 1, 2]);
    }

    #[test]
    fn test_write_static_blog() {
        let dir = TempDir::new().unwrap();
        let mut config = test_config(dir.path());
        write_templates(&config.templates_dir);
        fs::create_dir_all(&config.posts_dir).unwrap();
        fs::write(config.posts_dir.join("hello.md"), "~~ Title: Hello World\n~~ Date: 1 April 2012\nHi there.\n").unwrap();
        fs::write(config.posts_dir.join("about.md"), "~~ Title: About\nMe.\n").unwrap();

        let static_dir = dir.path().join("static");
        fs::create_dir_all(&static_dir).unwrap();
        fs::write(static_dir.join("style.css"), "body {}").unwrap();
        config.static_files_dir = Some(static_dir);

        let config = Arc::new(config);
        let renderer = TemplateRenderer::new(config.clone());
        let output_dir = config.output_dir.clone();
        assert_eq!(write_static_blog(&config, &renderer, &output_dir).unwrap(), 2);

        let index = fs::read_to_string(output_dir.join("index.html")).unwrap();
        assert!(index.contains("<a href=\"2012/4/hello_world.html\">Hello World</a>"));
        // Undated posts sort after every dated one
        assert!(index.find("hello_world.html").unwrap() < index.find("about.html").unwrap());

        let post = fs::read_to_string(output_dir.join("2012/4/hello_world.html")).unwrap();
        assert!(post.contains("<p>Hi there.</p>"));
        assert!(post.contains("href=\"../../static/style.css\""));

        assert!(output_dir.join("about.html").is_file());
        assert!(output_dir.join("feed.xml").is_file());
        assert_eq!(fs::read_to_string(output_dir.join("static/style.css")).unwrap(), "body {}");
        assert_eq!(fs::read_to_string(output_dir.join("2012/4/index.html")).unwrap(), generate_redirect("../../"));
    }
}
