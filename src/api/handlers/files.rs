use crate::AppState;
use crate::api::error::AppError;
use crate::services::file_service::{Attachment, TokenDownload, UploadedFile};
use crate::services::storage::StoredObject;
use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::Response,
};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use utoipa::{IntoParams, ToSchema};

/// Multipart form accepted by `POST /upload`.
#[derive(ToSchema)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteParams {
    /// Object path or URL; only the last segment is used as the key
    #[serde(rename = "imagePath")]
    pub image_path: String,
}

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Public URL of the stored file (empty when no file was sent)", body = String),
        (status = 500, description = "File upload failed", body = String)
    ),
    tag = "files"
)]
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<String, AppError> {
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Upload(e.into()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("unnamed").to_string();
        let content_type = field.content_type().map(|s| s.to_string());
        let data = field.bytes().await.map_err(|e| AppError::Upload(e.into()))?;

        file = Some(UploadedFile {
            file_name,
            content_type,
            data,
        });
    }

    let url = state
        .file_service
        .upload(file)
        .await
        .map_err(AppError::Upload)?;

    Ok(url.unwrap_or_default())
}

#[utoipa::path(
    get,
    path = "/file/{key}",
    params(
        ("key" = String, Path, description = "Object key")
    ),
    responses(
        (status = 200, description = "File content stream"),
        (status = 500, description = "Object missing or storage unavailable")
    ),
    tag = "files"
)]
pub async fn get_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    fetch_object(&state, &key).await
}

#[utoipa::path(
    get,
    path = "/download/{fileName}",
    params(
        ("fileName" = String, Path, description = "Object key")
    ),
    responses(
        (status = 200, description = "File content stream"),
        (status = 500, description = "Object missing or storage unavailable")
    ),
    tag = "files"
)]
pub async fn download_file(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<Response, AppError> {
    fetch_object(&state, &file_name).await
}

async fn fetch_object(state: &AppState, key: &str) -> Result<Response, AppError> {
    let object = state
        .file_service
        .fetch(key)
        .await
        .map_err(AppError::Retrieval)?;

    let content_type = object
        .content_type
        .clone()
        .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());
    stream_response(object, Some(&content_type), None)
        .map_err(|e| AppError::Retrieval(e.into()))
}

#[utoipa::path(
    delete,
    path = "/delete",
    params(DeleteParams),
    responses(
        (status = 200, description = "Image deleted successfully", body = String),
        (status = 500, description = "Error while deleting the image", body = String)
    ),
    tag = "files"
)]
pub async fn delete_image(
    State(state): State<AppState>,
    Query(params): Query<DeleteParams>,
) -> Result<&'static str, AppError> {
    state
        .file_service
        .delete_by_path(&params.image_path)
        .await
        .map_err(AppError::Delete)?;

    Ok("Image deleted successfully")
}

#[utoipa::path(
    get,
    path = "/{filePath}/{token}",
    params(
        ("filePath" = String, Path, description = "Object key"),
        ("token" = String, Path, description = "Download token")
    ),
    responses(
        (status = 200, description = "File served as attachment"),
        (status = 400, description = "Token rejected"),
        (status = 500, description = "Failed to retrieve the file", body = String)
    ),
    tag = "files"
)]
pub async fn get_file_with_token(
    State(state): State<AppState>,
    Path((file_path, token)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let attachment = match state
        .file_service
        .fetch_with_token(&file_path, &token)
        .await
        .map_err(AppError::Attachment)?
    {
        TokenDownload::Granted(attachment) => attachment,
        TokenDownload::Denied => return Err(AppError::BadRequest),
    };

    let Attachment {
        object,
        content_type,
        file_name,
    } = attachment;

    let disposition = content_disposition(&file_name);
    stream_response(object, Some(content_type), Some(&disposition))
        .map_err(|e| AppError::Attachment(e.into()))
}

fn stream_response(
    object: StoredObject,
    content_type: Option<&str>,
    disposition: Option<&str>,
) -> Result<Response, axum::http::Error> {
    let mut builder = Response::builder().status(StatusCode::OK);

    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    if let Some(length) = object.content_length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }
    if let Some(disposition) = disposition {
        builder = builder.header(header::CONTENT_DISPOSITION, disposition);
    }

    let stream = ReaderStream::new(object.body.into_async_read());
    builder.body(Body::from_stream(stream))
}

/// `attachment; filename="..."`, with an RFC 5987 `filename*` only when the
/// name had to be altered to fit in a quoted ASCII string.
pub(crate) fn content_disposition(file_name: &str) -> String {
    let ascii_filename = file_name
        .chars()
        .filter(|c| c.is_ascii() && !c.is_control() && *c != '"' && *c != '\\')
        .collect::<String>();
    let fallback_filename = if ascii_filename.is_empty() {
        "file"
    } else {
        &ascii_filename
    };

    if fallback_filename == file_name {
        format!("attachment; filename=\"{}\"", file_name)
    } else {
        let encoded_filename = utf8_percent_encode(file_name, NON_ALPHANUMERIC).to_string();
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback_filename, encoded_filename
        )
    }
}
