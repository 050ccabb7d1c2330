use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use spdlog::info;

use crate::error::Result;
use crate::post_list::PostList;
use crate::render_tree::RenderTree;

/// Sorted posts and the tree built from them. Never changes once built.
#[derive(Debug, Default)]
pub struct Site {
    posts: PostList,
    tree: RenderTree,
}

impl Site {
    pub fn build(posts_dir: &Path, with_feed: bool) -> Result<Site> {
        Self::rebuild(posts_dir, with_feed, &PostList::default())
    }

    fn rebuild(posts_dir: &Path, with_feed: bool, previous: &PostList) -> Result<Site> {
        let mut posts = PostList::scan_reusing(posts_dir, previous)?;
        posts.sort();
        let tree = RenderTree::build(posts.as_slice(), with_feed)?;
        Ok(Site { posts, tree })
    }

    pub fn posts(&self) -> &PostList {
        &self.posts
    }

    pub fn tree(&self) -> &RenderTree {
        &self.tree
    }
}

/// The site currently being served. Readers grab the current snapshot, refreshes swap in a new one.
#[derive(Debug)]
pub struct LiveSite {
    posts_dir: PathBuf,
    with_feed: bool,
    current: RwLock<Arc<Site>>,
}

impl LiveSite {
    pub fn load(posts_dir: impl Into<PathBuf>, with_feed: bool) -> Result<LiveSite> {
        let posts_dir = posts_dir.into();
        let site = Site::build(&posts_dir, with_feed)?;
        info!("Loaded {} posts from {}", site.posts.len(), posts_dir.display());
        Ok(LiveSite {
            posts_dir,
            with_feed,
            current: RwLock::new(Arc::new(site)),
        })
    }

    pub fn snapshot(&self) -> Arc<Site> {
        self.current.read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Rebuilds when posts were added, removed or edited. Returns whether a new snapshot went live.
    pub fn refresh(&self) -> Result<bool> {
        let current = self.snapshot();
        if !current.posts.is_stale(&self.posts_dir)? {
            return Ok(false);
        }

        // Built outside the lock, readers keep the old snapshot until the swap
        let site = Site::rebuild(&self.posts_dir, self.with_feed, &current.posts)?;
        info!("Posts changed, rebuilt site with {} posts", site.posts.len());

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(site);
        Ok(true)
    }
}
