//! Feed aggregation - turns ordered post rows into display-ready feed items.
//!
//! Every page (home, cursor feed, profile, post detail) hands its candidate
//! posts here. Authors, comment counters and comments are batch-loaded once
//! for the whole candidate set, joined in memory, filtered for banned authors
//! and capped at one page.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::{CommentWithAuthor, FeedItem, Post, User};
use crate::error::RepoError;
use crate::ports::{CommentRepository, UserRepository};

/// Feed items emitted per page.
pub const POSTS_PER_PAGE: usize = 20;

/// Comments fetched in preview mode, across the whole candidate set.
pub const PREVIEW_COMMENT_LIMIT: u64 = 3;

/// How many comments to attach to each item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentMode {
    /// Only the [`PREVIEW_COMMENT_LIMIT`] newest comments of the whole batch.
    Preview,
    /// Every comment of every candidate.
    Full,
}

impl CommentMode {
    fn limit(self) -> Option<u64> {
        match self {
            CommentMode::Preview => Some(PREVIEW_COMMENT_LIMIT),
            CommentMode::Full => None,
        }
    }
}

/// Feed assembly errors. No partial result accompanies them.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Feed aggregation failed: {0}")]
    Aggregation(#[from] RepoError),
}

/// Joins candidate posts with authors, counters and comments.
#[derive(Clone)]
pub struct FeedAssembler {
    users: Arc<dyn UserRepository>,
    comments: Arc<dyn CommentRepository>,
    page_size: usize,
}

impl FeedAssembler {
    pub fn new(users: Arc<dyn UserRepository>, comments: Arc<dyn CommentRepository>) -> Self {
        Self {
            users,
            comments,
            page_size: POSTS_PER_PAGE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Build feed items for `candidates`, keeping their order.
    ///
    /// The caller orders the candidates; this only filters and truncates.
    /// Posts by banned (or vanished) authors are dropped and at most one page
    /// of items is returned. In [`CommentMode::Preview`] the comment fetch is
    /// capped for the whole batch, so a post whose comments are all older
    /// than the batch's newest three shows none of them.
    pub async fn assemble(
        &self,
        candidates: Vec<Post>,
        csrf_token: &str,
        mode: CommentMode,
    ) -> Result<Vec<FeedItem>, FeedError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids = distinct_ids(candidates.iter().map(|p| p.id));
        let author_ids = distinct_ids(candidates.iter().map(|p| p.user_id));

        let counts: HashMap<i32, i64> = self
            .comments
            .counts_for_posts(&post_ids)
            .await?
            .into_iter()
            .map(|c| (c.post_id, c.count))
            .collect();

        let authors: HashMap<i32, User> = self
            .users
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let fetched = self
            .comments
            .recent_for_posts(&post_ids, mode.limit())
            .await?;
        let comments_by_post = group_ascending(fetched);

        tracing::debug!(
            candidates = candidates.len(),
            authors = authors.len(),
            commented_posts = comments_by_post.len(),
            ?mode,
            "Assembling feed"
        );

        let mut items = Vec::with_capacity(candidates.len().min(self.page_size));
        for post in candidates {
            let Some(user) = authors.get(&post.user_id) else {
                tracing::warn!(
                    post_id = post.id,
                    user_id = post.user_id,
                    "Dropping post without author row"
                );
                continue;
            };
            if user.is_banned() {
                continue;
            }

            items.push(FeedItem {
                image_url: post.image_url(),
                comments: comments_by_post.get(&post.id).cloned().unwrap_or_default(),
                comment_count: counts.get(&post.id).copied().unwrap_or(0),
                user: user.clone(),
                csrf_token: csrf_token.to_string(),
                post,
            });

            if items.len() >= self.page_size {
                break;
            }
        }

        Ok(items)
    }
}

fn distinct_ids(ids: impl Iterator<Item = i32>) -> Vec<i32> {
    let mut ids: Vec<i32> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Group newest-first comments by post, then flip each group to oldest-first.
fn group_ascending(newest_first: Vec<CommentWithAuthor>) -> HashMap<i32, Vec<CommentWithAuthor>> {
    let mut grouped: HashMap<i32, Vec<CommentWithAuthor>> = HashMap::new();
    for c in newest_first {
        grouped.entry(c.comment.post_id).or_default().push(c);
    }
    for list in grouped.values_mut() {
        list.reverse();
    }
    grouped
}
