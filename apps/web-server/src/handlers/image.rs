//! Image serving from the blob store.

use actix_web::http::header::{CacheControl, CacheDirective};
use actix_web::{HttpResponse, web};


use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Seconds browsers may cache an image.
const IMAGE_MAX_AGE: u32 = 3600;

/// GET /image/{id}.{ext}
///
/// The extension must match the post's stored MIME type.
pub async fn serve_image(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    let (id, ext) = path.into_inner();
    let id: i32 = id.parse().map_err(|_| AppError::NotFound)?;

    let post = state.posts.find_by_id(id).await?.ok_or(AppError::NotFound)?;
    let bytes = state.images.retrieve(post.id, &post.mime, &ext).await?;

    Ok(HttpResponse::Ok()
        .content_type(post.mime)
        .insert_header(CacheControl(vec![CacheDirective::MaxAge(IMAGE_MAX_AGE)]))
        .body(bytes))
}
