//! Post entity for SeaORM.

use sea_orm::FromQueryResult;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub mime: String,
    /// Raw upload; the image store serves a copy of these bytes.
    pub imgdata: Vec<u8>,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
    #[sea_orm(has_one = "super::comment_count::Entity")]
    CommentCount,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl Related<super::comment_count::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CommentCount.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Post columns without the image bytes, for feed and lookup queries.
#[derive(Clone, Debug, PartialEq, Eq, FromQueryResult)]
pub struct PostRow {
    pub id: i32,
    pub user_id: i32,
    pub body: String,
    pub mime: String,
    pub created_at: DateTimeWithTimeZone,
}

impl PostRow {
    /// Columns selected into a [`PostRow`].
    pub fn columns() -> [Column; 5] {
        [
            Column::Id,
            Column::UserId,
            Column::Body,
            Column::Mime,
            Column::CreatedAt,
        ]
    }
}

/// Conversion from the image-less row to Domain Post.
impl From<PostRow> for shutter_core::domain::Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            body: row.body,
            mime: row.mime,
            created_at: row.created_at.into(),
        }
    }
}

/// Conversion from SeaORM Model to Domain Post, dropping the bytes.
impl From<Model> for shutter_core::domain::Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            body: model.body,
            mime: model.mime,
            created_at: model.created_at.into(),
        }
    }
}
