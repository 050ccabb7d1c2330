use std::collections::btree_map::{Entry, Values};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::post::Post;

/// Reserved name of the redirect placed in every generated directory, and of the root listing.
pub const INDEX_FILE: &str = "index.html";
pub const FEED_FILE: &str = "feed.xml";

#[derive(Debug)]
pub enum RenderNode {
    Directory(Directory),
    Post(Arc<Post>),
    /// Relative path back to the root of the tree.
    Redirect(String),
    Feed(Arc<[Arc<Post>]>),
}

/// Directories own their children. Instead of a link to the parent, each one
/// remembers how deep it sits, which is all the parent was needed for.
#[derive(Debug, Default)]
pub struct Directory {
    depth: usize,
    children: BTreeMap<String, RenderNode>,
}

impl Directory {
    fn generated(depth: usize) -> Directory {
        let mut dir = Directory {
            depth,
            children: BTreeMap::new(),
        };
        dir.children.insert(INDEX_FILE.to_string(), RenderNode::Redirect(root_path(depth)));
        dir
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Prefix that leads from files in this directory back to the root.
    pub fn root_path(&self) -> String {
        root_path(self.depth)
    }

    pub fn get(&self, name: &str) -> Option<&RenderNode> {
        self.children.get(name)
    }

    pub fn children(&self) -> impl Iterator<Item=(&str, &RenderNode)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Where a request for the directory itself should go. Directories whose
    /// index is a post send the visitor back to the root.
    pub fn redirect_target(&self) -> String {
        match self.children.get(INDEX_FILE) {
            Some(RenderNode::Redirect(target)) => target.clone(),
            _ => self.root_path(),
        }
    }
}

pub fn root_path(depth: usize) -> String {
    "../".repeat(depth)
}

/// What a path resolves to inside the tree.
pub enum Resolved<'a> {
    Root(&'a Directory),
    Directory(&'a Directory),
    Post { post: &'a Arc<Post>, root_path: String },
    Redirect(&'a str),
    Feed(&'a [Arc<Post>]),
}

#[derive(Debug, Default)]
pub struct RenderTree {
    root: Directory,
}

impl RenderTree {
    /// Places every post under its URL. Fails without a partial tree on the first collision.
    pub fn build(posts: &[Arc<Post>], with_feed: bool) -> Result<RenderTree> {
        let mut tree = RenderTree::default();
        for post in posts {
            tree.insert_post(post.clone())?;
        }

        if with_feed {
            tree.root.children.insert(FEED_FILE.to_string(), RenderNode::Feed(posts.into()));
        }

        Ok(tree)
    }

    fn insert_post(&mut self, post: Arc<Post>) -> Result<()> {
        let url = post.create_url();
        let mut segments: Vec<&str> = url.split('/').filter(|s| !s.is_empty()).collect();
        let Some(leaf) = segments.pop() else {
            return Err(Error::Conflict { url: url.clone(), segment: String::new() });
        };

        if segments.is_empty() && (leaf == INDEX_FILE || leaf == FEED_FILE) {
            return Err(Error::Conflict { url: url.clone(), segment: leaf.to_string() });
        }

        if let Some(segment) = segments.iter().find(|s| **s == "." || **s == "..") {
            return Err(Error::RelativeSegment { url: url.clone(), segment: segment.to_string() });
        }

        let mut dir = &mut self.root;
        for segment in segments {
            let depth = dir.depth + 1;
            let child = dir.children.entry(segment.to_string())
                .or_insert_with(|| RenderNode::Directory(Directory::generated(depth)));
            dir = match child {
                RenderNode::Directory(child) => child,
                _ => return Err(Error::NotADirectory { url: url.clone(), segment: segment.to_string() }),
            };
        }

        match dir.children.entry(leaf.to_string()) {
            Entry::Vacant(entry) => {
                entry.insert(RenderNode::Post(post));
                Ok(())
            }
            // A directory-style post takes the place of the generated redirect
            Entry::Occupied(mut entry) if leaf == INDEX_FILE && matches!(entry.get(), RenderNode::Redirect(_)) => {
                entry.insert(RenderNode::Post(post));
                Ok(())
            }
            Entry::Occupied(_) => Err(Error::Conflict { url: url.clone(), segment: leaf.to_string() }),
        }
    }

    pub fn root(&self) -> &Directory {
        &self.root
    }

    /// Walks a request path like `/2012/4/hello.html` down the tree.
    pub fn resolve(&self, path: &str) -> Option<Resolved<'_>> {
        let path = path.trim_matches('/');
        if path.is_empty() {
            return Some(Resolved::Root(&self.root));
        }

        let mut dir = &self.root;
        let mut segments = path.split('/').peekable();
        while let Some(segment) = segments.next() {
            let node = dir.get(segment)?;
            let last = segments.peek().is_none();
            match node {
                RenderNode::Directory(child) if last => return Some(Resolved::Directory(child)),
                RenderNode::Directory(child) => dir = child,
                _ if !last => return None,
                RenderNode::Post(post) => return Some(Resolved::Post { post, root_path: dir.root_path() }),
                RenderNode::Redirect(target) => return Some(Resolved::Redirect(target)),
                RenderNode::Feed(posts) => return Some(Resolved::Feed(posts)),
            }
        }

        None
    }

    /// Depth-first walk over every post in the tree. Call again to start over.
    pub fn posts(&self) -> Posts<'_> {
        Posts {
            stack: vec![self.root.children.values()],
        }
    }
}

pub struct Posts<'a> {
    stack: Vec<Values<'a, String, RenderNode>>,
}

impl<'a> Iterator for Posts<'a> {
    type Item = &'a Arc<Post>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                None => {
                    self.stack.pop();
                }
                Some(RenderNode::Directory(dir)) => self.stack.push(dir.children.values()),
                Some(RenderNode::Post(post)) => return Some(post),
                Some(_) => {}
            }
        }
    }
}
