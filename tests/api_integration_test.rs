use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use bytes::Bytes;
use http_body_util::BodyExt;
use rust_s3_gateway::config::{KeyStrategy, ServiceConfig};
use rust_s3_gateway::services::file_service::{FileService, UploadedFile};
use rust_s3_gateway::services::storage::{StorageService, StoredObject};
use rust_s3_gateway::utils::auth::{AcceptAllTokens, JwtTokenValidator, TokenValidator};
use rust_s3_gateway::{AppState, create_app};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::ServiceExt;

const RETURN_URL: &str = "https://cdn.example.com/media/";
const BOUNDARY: &str = "----gatewaytestboundary";

#[derive(Default)]
struct MockStorageService {
    files: Mutex<HashMap<String, (Vec<u8>, Option<String>)>>,
    put_calls: AtomicUsize,
    get_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    deleted_keys: Mutex<Vec<String>>,
    fail_writes: bool,
}

impl MockStorageService {
    fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> anyhow::Result<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(anyhow::anyhow!("connection reset"));
        }
        self.files.lock().unwrap().insert(
            key.to_string(),
            (data.to_vec(), content_type.map(str::to_string)),
        );
        Ok(())
    }

    async fn get_object(&self, key: &str) -> anyhow::Result<StoredObject> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let (data, content_type) = self
            .files
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("NoSuchKey"))?;

        Ok(StoredObject {
            content_length: Some(data.len() as i64),
            content_type,
            body: ByteStream::from(data),
        })
    }

    async fn delete_object(&self, key: &str) -> anyhow::Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(anyhow::anyhow!("AccessDenied"));
        }
        self.deleted_keys.lock().unwrap().push(key.to_string());
        self.files.lock().unwrap().remove(key);
        Ok(())
    }

    async fn check_connection(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

fn service_config() -> ServiceConfig {
    ServiceConfig {
        return_url: RETURN_URL.to_string(),
        key_strategy: KeyStrategy::Legacy,
        ..ServiceConfig::default()
    }
}

fn setup_app_with(
    storage: Arc<MockStorageService>,
    validator: Arc<dyn TokenValidator>,
) -> Router {
    let config = service_config();
    let file_service = Arc::new(FileService::new(storage.clone(), validator, &config));

    create_app(AppState {
        storage,
        file_service,
        config,
    })
}

fn setup_app(storage: Arc<MockStorageService>) -> Router {
    setup_app_with(storage, Arc::new(AcceptAllTokens))
}

fn multipart_request(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

#[tokio::test]
async fn test_upload_then_download_round_trip() {
    let storage = Arc::new(MockStorageService::default());
    let app = setup_app(storage.clone());

    let payload = b"0123456789";
    let response = app
        .clone()
        .oneshot(multipart_request("file", "note.txt", "text/plain", payload))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let locator = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
    let key = locator
        .strip_prefix(RETURN_URL)
        .expect("locator starts with the configured prefix")
        .to_string();
    assert!(key.starts_with("note_"));
    assert!(key.ends_with(".txt"));
    assert_eq!(key.len(), "note_".len() + 8 + ".txt".len());
    assert_eq!(storage.put_calls.load(Ordering::SeqCst), 1);

    let stored = storage.files.lock().unwrap().get(&key).cloned().unwrap();
    assert_eq!(stored.1.as_deref(), Some("text/plain"));

    for uri in [format!("/file/{}", key), format!("/download/{}", key)] {
        let response = app.clone().oneshot(get(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_LENGTH).unwrap(),
            "10"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain"
        );
        assert_eq!(body_bytes(response).await.as_ref(), payload);
    }
    assert_eq!(storage.get_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_upload_without_file_field_is_a_no_op() {
    let storage = Arc::new(MockStorageService::default());
    let app = setup_app(storage.clone());

    let response = app
        .oneshot(multipart_request("avatar", "me.png", "image/png", b"png"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_bytes(response).await.is_empty());
    assert_eq!(storage.put_calls.load(Ordering::SeqCst), 0);
    assert!(storage.files.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_storage_failure_returns_fixed_message() {
    let storage = Arc::new(MockStorageService::failing());
    let app = setup_app(storage.clone());

    let response = app
        .oneshot(multipart_request("file", "note.txt", "text/plain", b"hello"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_bytes(response).await.as_ref(), b"File upload failed");
    assert_eq!(storage.put_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_download_missing_key_is_single_call_and_empty_500() {
    let storage = Arc::new(MockStorageService::default());
    let app = setup_app(storage.clone());

    let response = app.oneshot(get("/file/missing.png")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_bytes(response).await.is_empty());
    assert_eq!(storage.get_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_delete_uses_trailing_segment_as_key() {
    let storage = Arc::new(MockStorageService::default());
    let app = setup_app(storage.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/delete?imagePath=a/b/image.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_bytes(response).await.as_ref(),
        b"Image deleted successfully"
    );
    assert_eq!(storage.delete_calls.load(Ordering::SeqCst), 1);
    assert_eq!(*storage.deleted_keys.lock().unwrap(), vec!["image.png"]);
}

#[tokio::test]
async fn test_delete_failure_returns_fixed_message() {
    let storage = Arc::new(MockStorageService::failing());
    let app = setup_app(storage.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/delete?imagePath=https://cdn.example.com/media/x.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_bytes(response).await.as_ref(),
        b"Error while deleting the image"
    );
    assert_eq!(storage.delete_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_delete_path_without_key_skips_backend() {
    let storage = Arc::new(MockStorageService::default());
    let app = setup_app(storage.clone());

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/delete?imagePath=a/b/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(storage.delete_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_token_route_serves_attachment() {
    let storage = Arc::new(MockStorageService::default());
    storage.files.lock().unwrap().insert(
        "photo.JPG".to_string(),
        (b"jpegdata".to_vec(), None),
    );
    let app = setup_app(storage.clone());

    let response = app.oneshot(get("/photo.JPG/any-token")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/jpeg"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"photo.JPG\""
    );
    assert_eq!(body_bytes(response).await.as_ref(), b"jpegdata");
}

#[tokio::test]
async fn test_token_route_unknown_extension_defaults_to_octet_stream() {
    let storage = Arc::new(MockStorageService::default());
    storage
        .files
        .lock()
        .unwrap()
        .insert("bundle.tar".to_string(), (b"tar".to_vec(), None));
    let app = setup_app(storage);

    let response = app.oneshot(get("/bundle.tar/t")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/octet-stream"
    );
}

#[tokio::test]
async fn test_token_route_missing_object_is_500() {
    let storage = Arc::new(MockStorageService::default());
    let app = setup_app(storage.clone());

    let response = app.oneshot(get("/nothing.pdf/t")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_bytes(response).await.as_ref(),
        b"Failed to retrieve the file"
    );
    assert_eq!(storage.get_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_token_route_rejects_invalid_jwt() {
    let storage = Arc::new(MockStorageService::default());
    storage
        .files
        .lock()
        .unwrap()
        .insert("doc.pdf".to_string(), (b"pdf".to_vec(), None));
    let app = setup_app_with(storage.clone(), Arc::new(JwtTokenValidator::new("secret")));

    let response = app.oneshot(get("/doc.pdf/not-a-jwt")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(storage.get_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_health_check() {
    let app = setup_app(Arc::new(MockStorageService::default()));

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["storage"], "connected");
}

#[tokio::test]
async fn test_file_service_upload_none_writes_nothing() {
    let storage = Arc::new(MockStorageService::default());
    let service = FileService::new(storage.clone(), Arc::new(AcceptAllTokens), &service_config());

    assert!(service.upload(None).await.unwrap().is_none());
    assert_eq!(storage.put_calls.load(Ordering::SeqCst), 0);

    let url = service
        .upload(Some(UploadedFile {
            file_name: "report.pdf".to_string(),
            content_type: Some("application/pdf".to_string()),
            data: Bytes::from_static(b"%PDF"),
        }))
        .await
        .unwrap()
        .unwrap();
    assert!(url.starts_with("https://cdn.example.com/media/report_"));
    assert!(url.ends_with(".pdf"));
}
