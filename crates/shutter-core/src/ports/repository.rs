use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Comment, CommentCount, CommentWithAuthor, NewComment, NewPost, NewUser, Post, User,
};
use crate::error::RepoError;

/// Point lookup shared by every repository.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;
}

/// User repository with account and moderation queries.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i32> {
    /// Find a user that is not banned by account name.
    async fn find_active_by_account_name(
        &self,
        account_name: &str,
    ) -> Result<Option<User>, RepoError>;

    /// Whether any user (banned or not) holds this account name.
    async fn account_name_exists(&self, account_name: &str) -> Result<bool, RepoError>;

    /// Insert a regular, unbanned account.
    async fn create(&self, user: NewUser) -> Result<User, RepoError>;

    /// Batch lookup through a single `IN (...)` query. Order is unspecified.
    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, RepoError>;

    /// Regular users that are not banned yet, newest first.
    async fn list_bannable(&self) -> Result<Vec<User>, RepoError>;

    /// Set the ban flag on every listed user. Returns the number of rows touched.
    async fn ban(&self, ids: &[i32]) -> Result<u64, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i32> {
    /// Newest posts whose author is not banned, optionally at or before a cursor.
    async fn find_recent(
        &self,
        limit: u64,
        max_created_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<Post>, RepoError>;

    /// All posts of one author, newest first.
    async fn find_by_user_id(&self, user_id: i32) -> Result<Vec<Post>, RepoError>;

    /// Insert the post and its zero comment counter in one transaction.
    ///
    /// The image bytes move into the insert and are handed back alongside
    /// the stored post so the caller can write the blob without a copy.
    async fn create_with_counter(&self, post: NewPost) -> Result<(Post, Vec<u8>), RepoError>;
}

/// Comment repository, including the denormalized counter.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Counter rows for the given posts, one `IN (...)` query.
    async fn counts_for_posts(&self, post_ids: &[i32]) -> Result<Vec<CommentCount>, RepoError>;

    /// Comments of the given posts joined with their authors, newest first.
    ///
    /// `limit` caps the whole result set, not each post.
    async fn recent_for_posts(
        &self,
        post_ids: &[i32],
        limit: Option<u64>,
    ) -> Result<Vec<CommentWithAuthor>, RepoError>;

    /// Insert the comment and bump the post's counter in one transaction.
    async fn create_and_increment(&self, comment: NewComment) -> Result<Comment, RepoError>;

    /// Comments written by a user.
    async fn count_by_user_id(&self, user_id: i32) -> Result<u64, RepoError>;

    /// Comments received on any of the given posts.
    async fn count_on_posts(&self, post_ids: &[i32]) -> Result<u64, RepoError>;
}
