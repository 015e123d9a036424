//! Image upload: multipart form to post row, counter row and blob.

use actix_multipart::{Field, Multipart};
use actix_web::{HttpResponse, web};
use futures::TryStreamExt;

use shutter_core::domain::{ImageMime, NewPost, UPLOAD_LIMIT};

use super::{current_user, flash_redirect, redirect};
use crate::middleware::error::{AppError, AppResult};
use crate::middleware::session::Session;
use crate::state::AppState;

pub(crate) const FILE_REQUIRED: &str = "Please select an image";
pub(crate) const UNSUPPORTED_TYPE: &str = "Only jpg, png and gif images can be posted";
pub(crate) const FILE_TOO_LARGE: &str = "File size is too large";

#[derive(Debug, Default)]
struct UploadForm {
    csrf_token: String,
    body: String,
    file: Option<UploadedFile>,
}

#[derive(Debug)]
struct UploadedFile {
    content_type: String,
    bytes: Vec<u8>,
    /// Set once the part exceeded the upload limit; buffering stops there.
    oversized: bool,
}

/// POST /
pub async fn create_post(
    state: web::Data<AppState>,
    session: Session,
    payload: Multipart,
) -> AppResult<HttpResponse> {
    let Some(me) = current_user(&state, &session).await? else {
        return redirect(&state, &session, "/login").await;
    };

    let form = read_form(payload).await?;

    if !session.csrf_matches(&form.csrf_token) {
        return Err(AppError::Unprocessable);
    }

    let Some(file) = form.file else {
        return flash_redirect(&state, session, FILE_REQUIRED, "/").await;
    };
    let Some(mime) = ImageMime::sniff_content_type(&file.content_type) else {
        return flash_redirect(&state, session, UNSUPPORTED_TYPE, "/").await;
    };
    if file.oversized {
        return flash_redirect(&state, session, FILE_TOO_LARGE, "/").await;
    }

    let (post, imgdata) = state
        .posts
        .create_with_counter(NewPost {
            user_id: me.id,
            body: form.body,
            mime,
            imgdata: file.bytes,
        })
        .await?;

    // The rows are committed; a failed blob write leaves a post without image.
    if let Err(e) = state.images.store(post.id, mime, &imgdata).await {
        tracing::error!(post_id = post.id, error = %e, "Image write failed after commit");
        return Err(e.into());
    }

    redirect(&state, &session, &format!("/posts/{}", post.id)).await
}

async fn read_form(mut payload: Multipart) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = payload.try_next().await.map_err(bad_multipart)? {
        let name = field
            .content_disposition()
            .get_name()
            .unwrap_or_default()
            .to_string();

        match name.as_str() {
            "file" => form.file = read_file(field).await?,
            "csrf_token" => form.csrf_token = read_text(field).await?,
            "body" => form.body = read_text(field).await?,
            _ => drain(field).await?,
        }
    }

    Ok(form)
}

/// Buffer the file part up to one byte past the limit. An empty part with no
/// file name is what browsers send when nothing was picked.
async fn read_file(mut field: Field) -> AppResult<Option<UploadedFile>> {
    let content_type = field
        .content_type()
        .map(|m| m.to_string())
        .unwrap_or_default();
    let has_name = field
        .content_disposition()
        .get_filename()
        .is_some_and(|n| !n.is_empty());

    let mut bytes = Vec::new();
    let mut oversized = false;
    while let Some(chunk) = field.try_next().await.map_err(bad_multipart)? {
        if oversized {
            continue;
        }
        bytes.extend_from_slice(&chunk);
        if bytes.len() > UPLOAD_LIMIT {
            oversized = true;
            bytes = Vec::new();
        }
    }

    if !oversized && bytes.is_empty() && !has_name {
        return Ok(None);
    }

    Ok(Some(UploadedFile {
        content_type,
        bytes,
        oversized,
    }))
}

async fn read_text(mut field: Field) -> AppResult<String> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(bad_multipart)? {
        bytes.extend_from_slice(&chunk);
    }
    String::from_utf8(bytes).map_err(|_| AppError::BadRequest("Form field is not UTF-8".into()))
}

async fn drain(mut field: Field) -> AppResult<()> {
    while field.try_next().await.map_err(bad_multipart)?.is_some() {}
    Ok(())
}

fn bad_multipart(e: actix_multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Malformed multipart body: {}", e))
}
