use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use spdlog::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::post::Post;

const POST_EXTENSION: &str = "md";

#[derive(Debug, Clone, Default)]
pub struct PostList {
    posts: Vec<Arc<Post>>,
}

/// Every markdown file below `root_dir`, in path order. The first walk error aborts the scan.
pub fn find_post_files(root_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = vec![];
    for entry in WalkDir::new(root_dir) {
        let entry = entry.map_err(|source| Error::Scan {
            path: root_dir.to_path_buf(),
            source,
        })?;

        if entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| ext == POST_EXTENSION) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Dated posts come first and order by date. Undated posts follow, ordered by URL.
/// Ties on the date fall back to the URL, so this is a total order.
pub fn compare_posts(a: &Post, b: &Post) -> Ordering {
    match (a.parsed_date(), b.parsed_date()) {
        (Some(da), Some(db)) => da.cmp(&db)
            .then_with(|| a.create_url().cmp(&b.create_url())),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.create_url().cmp(&b.create_url()),
    }
}

impl PostList {
    pub fn scan(root_dir: &Path) -> Result<PostList> {
        Self::scan_reusing(root_dir, &PostList::default())
    }

    /// Scans `root_dir`, keeping posts from `previous` whose files did not change.
    pub fn scan_reusing(root_dir: &Path, previous: &PostList) -> Result<PostList> {
        let known: HashMap<&Path, &Arc<Post>> = previous.posts.iter()
            .map(|post| (post.path(), post))
            .collect();

        let mut posts = vec![];
        for file in find_post_files(root_dir)? {
            let post = match known.get(file.as_path()) {
                Some(&existing) => {
                    let mut post = Post::clone(existing);
                    if post.refresh()? {
                        debug!("Post changed: {}", post);
                        Arc::new(post)
                    } else {
                        existing.clone()
                    }
                }
                None => {
                    let post = Post::load(file)?;
                    debug!("Post loaded: {}", post);
                    Arc::new(post)
                }
            };
            posts.push(post);
        }

        Ok(PostList { posts })
    }

    /// True when posts were added, removed or edited under `root_dir`.
    pub fn is_stale(&self, root_dir: &Path) -> Result<bool> {
        let files = find_post_files(root_dir)?;
        if files.len() != self.posts.len() {
            return Ok(true);
        }

        let known: HashMap<&Path, &Arc<Post>> = self.posts.iter()
            .map(|post| (post.path(), post))
            .collect();
        for file in files.iter() {
            match known.get(file.as_path()) {
                Some(post) if post.is_up_to_date() => {}
                _ => return Ok(true),
            }
        }

        Ok(false)
    }

    pub fn sort(&mut self) {
        self.posts.sort_by(|a, b| compare_posts(a, b));
    }

    pub fn sort_descending(&mut self) {
        self.posts.sort_by(|a, b| compare_posts(b, a));
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn as_slice(&self) -> &[Arc<Post>] {
        &self.posts
    }

    pub fn iter(&self) -> impl Iterator<Item=&Arc<Post>> {
        self.posts.iter()
    }
}

impl From<Vec<Post>> for PostList {
    fn from(posts: Vec<Post>) -> Self {
        PostList {
            posts: posts.into_iter().map(Arc::new).collect(),
        }
    }
}
