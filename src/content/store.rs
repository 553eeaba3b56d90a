//! raw post content storage

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Post not found: {0}")]
    NotFound(String),

    #[error("Invalid post id: {0}")]
    InvalidPost(String),

    #[error("I/O error on post {post}: {source}")]
    Io {
        post: String,
        #[source]
        source: io::Error,
    },
}

/// where raw (unrendered) post content lives
pub trait ContentStore {
    fn raw_content(&self, post: &str) -> Result<String, StoreError>;
    fn write_raw_content(&mut self, post: &str, content: &str) -> Result<(), StoreError>;
}

/// one file per post under a root directory; the post id is the relative path
#[derive(Debug, Clone)]
pub struct FsContentStore {
    root: PathBuf,
}

impl FsContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, post: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(post);
        let escapes = relative.components().any(|c| {
            !matches!(c, std::path::Component::Normal(_) | std::path::Component::CurDir)
        });
        if post.is_empty() || escapes {
            return Err(StoreError::InvalidPost(post.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl ContentStore for FsContentStore {
    fn raw_content(&self, post: &str) -> Result<String, StoreError> {
        let path = self.path_of(post)?;
        fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(post.to_string()),
            _ => StoreError::Io {
                post: post.to_string(),
                source: e,
            },
        })
    }

    fn write_raw_content(&mut self, post: &str, content: &str) -> Result<(), StoreError> {
        let path = self.path_of(post)?;
        fs::write(&path, content).map_err(|e| StoreError::Io {
            post: post.to_string(),
            source: e,
        })
    }
}

/// in-memory store, used by tests and by callers that already hold content
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    posts: HashMap<String, String>,
    writes: usize,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_post(mut self, post: impl Into<String>, content: impl Into<String>) -> Self {
        self.posts.insert(post.into(), content.into());
        self
    }

    /// number of successful writes so far
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl ContentStore for MemoryContentStore {
    fn raw_content(&self, post: &str) -> Result<String, StoreError> {
        self.posts
            .get(post)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(post.to_string()))
    }

    fn write_raw_content(&mut self, post: &str, content: &str) -> Result<(), StoreError> {
        if !self.posts.contains_key(post) {
            return Err(StoreError::NotFound(post.to_string()));
        }
        self.posts.insert(post.to_string(), content.to_string());
        self.writes += 1;
        Ok(())
    }
}
