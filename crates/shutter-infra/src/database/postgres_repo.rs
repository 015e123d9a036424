//! PostgreSQL repository implementations.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set, TransactionTrait,
};
use sea_orm::JoinType;

use shutter_core::domain::{
    Comment, CommentCount, CommentWithAuthor, NewComment, NewPost, NewUser, Post, User,
};
use shutter_core::error::RepoError;
use shutter_core::ports::{BaseRepository, CommentRepository, PostRepository, UserRepository};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::comment_count::{self, Entity as CommentCountEntity};
use super::entity::post::{self, Entity as PostEntity, PostRow};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, repo_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_active_by_account_name(
        &self,
        account_name: &str,
    ) -> Result<Option<User>, RepoError> {
        tracing::debug!(account_name, "Finding active user by account name");

        let result = UserEntity::find()
            .filter(user::Column::AccountName.eq(account_name))
            .filter(user::Column::DelFlg.eq(0))
            .one(self.db.as_ref())
            .await
            .map_err(repo_err)?;

        Ok(result.map(Into::into))
    }

    async fn account_name_exists(&self, account_name: &str) -> Result<bool, RepoError> {
        let count = UserEntity::find()
            .filter(user::Column::AccountName.eq(account_name))
            .count(self.db.as_ref())
            .await
            .map_err(repo_err)?;

        Ok(count > 0)
    }

    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        let model = user::ActiveModel {
            account_name: Set(new_user.account_name),
            passhash: Set(new_user.passhash),
            authority: Set(0),
            del_flg: Set(0),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(self.db.as_ref())
        .await
        .map_err(repo_err)?;

        Ok(model.into())
    }

    async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<User>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(self.db.as_ref())
            .await
            .map_err(repo_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list_bannable(&self) -> Result<Vec<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Authority.eq(0))
            .filter(user::Column::DelFlg.eq(0))
            .order_by_desc(user::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(repo_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn ban(&self, ids: &[i32]) -> Result<u64, RepoError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = UserEntity::update_many()
            .col_expr(user::Column::DelFlg, Expr::value(1))
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .exec(self.db.as_ref())
            .await
            .map_err(repo_err)?;

        Ok(result.rows_affected)
    }
}

/// PostgreSQL post repository. Feed queries never load the image bytes.
pub struct PostgresPostRepository {
    db: Arc<DbConn>,
}

impl PostgresPostRepository {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self { db }
    }

    fn select_rows() -> sea_orm::Select<PostEntity> {
        PostEntity::find()
            .select_only()
            .columns(PostRow::columns())
    }
}

#[async_trait]
impl BaseRepository<Post, i32> for PostgresPostRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Post>, RepoError> {
        let result = Self::select_rows()
            .filter(post::Column::Id.eq(id))
            .into_model::<PostRow>()
            .one(self.db.as_ref())
            .await
            .map_err(repo_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_recent(
        &self,
        limit: u64,
        max_created_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<Post>, RepoError> {
        let mut query = Self::select_rows()
            .join(JoinType::InnerJoin, post::Relation::User.def())
            .filter(user::Column::DelFlg.eq(0));
        if let Some(cursor) = max_created_at {
            query = query.filter(post::Column::CreatedAt.lte(cursor));
        }

        let result = query
            .order_by_desc(post::Column::CreatedAt)
            .limit(limit)
            .into_model::<PostRow>()
            .all(self.db.as_ref())
            .await
            .map_err(repo_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_user_id(&self, user_id: i32) -> Result<Vec<Post>, RepoError> {
        let result = Self::select_rows()
            .filter(post::Column::UserId.eq(user_id))
            .order_by_desc(post::Column::CreatedAt)
            .into_model::<PostRow>()
            .all(self.db.as_ref())
            .await
            .map_err(repo_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn create_with_counter(
        &self,
        new_post: NewPost,
    ) -> Result<(Post, Vec<u8>), RepoError> {
        let txn = self.db.begin().await.map_err(repo_err)?;

        let mut created = post::ActiveModel {
            user_id: Set(new_post.user_id),
            mime: Set(new_post.mime.as_str().to_string()),
            imgdata: Set(new_post.imgdata),
            body: Set(new_post.body),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(repo_err)?;

        comment_count::ActiveModel {
            post_id: Set(created.id),
            count: Set(0),
        }
        .insert(&txn)
        .await
        .map_err(repo_err)?;

        txn.commit().await.map_err(repo_err)?;

        tracing::info!(post_id = created.id, user_id = created.user_id, "Post created");
        let imgdata = std::mem::take(&mut created.imgdata);
        Ok((created.into(), imgdata))
    }
}

/// PostgreSQL comment repository, owner of the comment counter.
pub struct PostgresCommentRepository {
    db: Arc<DbConn>,
}

impl PostgresCommentRepository {
    pub fn new(db: Arc<DbConn>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn counts_for_posts(&self, post_ids: &[i32]) -> Result<Vec<CommentCount>, RepoError> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = CommentCountEntity::find()
            .filter(comment_count::Column::PostId.is_in(post_ids.iter().copied()))
            .all(self.db.as_ref())
            .await
            .map_err(repo_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn recent_for_posts(
        &self,
        post_ids: &[i32],
        limit: Option<u64>,
    ) -> Result<Vec<CommentWithAuthor>, RepoError> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = CommentEntity::find()
            .select_also(UserEntity)
            .join(JoinType::InnerJoin, comment::Relation::User.def())
            .filter(comment::Column::PostId.is_in(post_ids.iter().copied()))
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_desc(comment::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(repo_err)?;

        Ok(rows
            .into_iter()
            // `select_also` yields an `Option` even under an inner join.
            .filter_map(|(comment, author)| {
                author.map(|author| CommentWithAuthor {
                    comment: comment.into(),
                    user: author.into(),
                })
            })
            .collect())
    }

    async fn create_and_increment(&self, new_comment: NewComment) -> Result<Comment, RepoError> {
        let txn = self.db.begin().await.map_err(repo_err)?;

        let created = comment::ActiveModel {
            post_id: Set(new_comment.post_id),
            user_id: Set(new_comment.user_id),
            comment: Set(new_comment.comment),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(repo_err)?;

        let bumped = CommentCountEntity::update_many()
            .col_expr(
                comment_count::Column::Count,
                Expr::col(comment_count::Column::Count).add(1),
            )
            .filter(comment_count::Column::PostId.eq(new_comment.post_id))
            .exec(&txn)
            .await
            .map_err(repo_err)?;

        if bumped.rows_affected == 0 {
            // Every post owns a counter row; none means no such post. Dropping
            // `txn` rolls the comment back.
            return Err(RepoError::NotFound);
        }

        txn.commit().await.map_err(repo_err)?;

        tracing::debug!(comment_id = created.id, post_id = created.post_id, "Comment added");
        Ok(created.into())
    }

    async fn count_by_user_id(&self, user_id: i32) -> Result<u64, RepoError> {
        CommentEntity::find()
            .filter(comment::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(repo_err)
    }

    async fn count_on_posts(&self, post_ids: &[i32]) -> Result<u64, RepoError> {
        if post_ids.is_empty() {
            return Ok(0);
        }

        CommentEntity::find()
            .filter(comment::Column::PostId.is_in(post_ids.iter().copied()))
            .count(self.db.as_ref())
            .await
            .map_err(repo_err)
    }
}
