use imagedb_atoms::media;
use imagedb_shared::AppState;
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::sync::Arc;

/// Main Lambda handler - routes the three image endpoints
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path();
    let body = event.body();
    tracing::info!("API Lambda invoked - Method: {} Path: {}", method, path);

    let store = state.images.as_ref();
    // Decode after splitting so an encoded `/` stays inside its segment
    let decoded: Vec<Cow<str>> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| percent_decode_str(s).decode_utf8_lossy())
        .collect();
    let parts: Vec<&str> = decoded.iter().map(|s| s.as_ref()).collect();

    match (method, parts.as_slice()) {
        // GET /images - list all images
        (&Method::GET, ["images"]) => media::list_images_handler(store).await,
        // POST /add_image - create image, id assigned by the store
        (&Method::POST, ["add_image"]) => media::create_image_handler(store, body).await,
        // DELETE /delete_image/{id} - delete image
        (&Method::DELETE, ["delete_image", image_id]) => {
            media::delete_image_handler(store, image_id).await
        }
        (_, ["images"] | ["add_image"] | ["delete_image", _]) => method_not_allowed(),
        _ => not_found(),
    }
}

fn not_found() -> Result<Response<Body>, Error> {
    media::detail_response(StatusCode::NOT_FOUND, "Not found")
}

fn method_not_allowed() -> Result<Response<Body>, Error> {
    media::detail_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use imagedb_atoms::media::{Image, ImageStore, MemoryImageStore, StoreError, Timestamp};
    use serde_json::{json, Value};

    fn memory_state() -> Arc<AppState> {
        Arc::new(AppState::new(Arc::new(MemoryImageStore::new())))
    }

    fn request(method: &str, uri: &str, body: &str) -> Request {
        let body = if body.is_empty() {
            Body::Empty
        } else {
            Body::from(body)
        };
        lambda_http::http::Request::builder()
            .method(method)
            .uri(uri)
            .body(body)
            .unwrap()
    }

    async fn call(state: &Arc<AppState>, method: &str, uri: &str, body: &str) -> Response<Body> {
        function_handler(request(method, uri, body), Arc::clone(state))
            .await
            .unwrap()
    }

    fn json_body(resp: &Response<Body>) -> Value {
        serde_json::from_slice(resp.body().as_ref()).unwrap()
    }

    struct UnreachableStore;

    #[async_trait]
    impl ImageStore for UnreachableStore {
        async fn list(&self) -> Result<Vec<Image>, StoreError> {
            Err(StoreError::Connectivity("connection refused".to_string()))
        }

        async fn insert(
            &self,
            _url: String,
            _created_at: Option<Timestamp>,
        ) -> Result<Image, StoreError> {
            Err(StoreError::Connectivity("connection refused".to_string()))
        }

        async fn delete(&self, _id: &str) -> Result<(), StoreError> {
            Err(StoreError::Connectivity("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_create_list_delete_scenario() {
        let state = memory_state();

        let resp = call(&state, "POST", "/add_image", r#"{"url": "http://x/1.png"}"#).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.headers()["Content-Type"], "application/json");
        let created = json_body(&resp);
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["url"], "http://x/1.png");
        assert_eq!(created["created_at"], Value::Null);

        let resp = call(&state, "GET", "/images", "").await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            json_body(&resp),
            json!([{"id": id, "url": "http://x/1.png", "created_at": null}])
        );

        let resp = call(&state, "DELETE", &format!("/delete_image/{}", id), "").await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(resp.body().is_empty());

        let resp = call(&state, "GET", "/images", "").await;
        assert_eq!(json_body(&resp), json!([]));

        let resp = call(&state, "DELETE", &format!("/delete_image/{}", id), "").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(&resp),
            json!({"detail": format!("Image with id {} not found", id)})
        );
    }

    #[tokio::test]
    async fn test_list_empty() {
        let state = memory_state();
        let resp = call(&state, "GET", "/images", "").await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(&resp), json!([]));
    }

    #[tokio::test]
    async fn test_create_keeps_created_at_and_ignores_client_id() {
        let state = memory_state();
        let resp = call(
            &state,
            "POST",
            "/add_image",
            r#"{"id": "abc123", "url": "http://x/2.png", "created_at": "2024-05-01T12:00:00Z"}"#,
        )
        .await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = json_body(&resp);
        assert_ne!(created["id"], "abc123");
        assert_eq!(created["created_at"], "2024-05-01T12:00:00Z");
    }

    #[tokio::test]
    async fn test_create_validation_errors() {
        let state = memory_state();

        for body in [r#"{}"#, r#"{"url": null}"#, "not json", ""] {
            let resp = call(&state, "POST", "/add_image", body).await;
            assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY, "body: {:?}", body);
            assert!(json_body(&resp)["detail"].is_string());
        }

        let resp = call(&state, "GET", "/images", "").await;
        assert_eq!(json_body(&resp), json!([]));
    }

    #[tokio::test]
    async fn test_delete_unknown_id() {
        let state = memory_state();
        call(&state, "POST", "/add_image", r#"{"url": "http://x/1.png"}"#).await;

        let resp = call(&state, "DELETE", "/delete_image/abc123", "").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(&resp),
            json!({"detail": "Image with id abc123 not found"})
        );

        let resp = call(&state, "GET", "/images", "").await;
        assert_eq!(json_body(&resp).as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_echoes_naive_created_at() {
        let state = memory_state();
        let resp = call(
            &state,
            "POST",
            "/add_image",
            r#"{"url": "http://x/3.png", "created_at": "2024-05-01T12:00:00"}"#,
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(json_body(&resp)["created_at"], "2024-05-01T12:00:00");

        let resp = call(&state, "GET", "/images", "").await;
        assert_eq!(json_body(&resp)[0]["created_at"], "2024-05-01T12:00:00");
    }

    #[tokio::test]
    async fn test_delete_id_is_percent_decoded() {
        let state = memory_state();
        let resp = call(&state, "DELETE", "/delete_image/a%20b", "").await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(&resp),
            json!({"detail": "Image with id a b not found"})
        );
    }

    #[tokio::test]
    async fn test_unknown_route_and_wrong_method() {
        let state = memory_state();

        let resp = call(&state, "GET", "/nope", "").await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(&resp), json!({"detail": "Not found"}));

        let resp = call(&state, "POST", "/images", "").await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

        let resp = call(&state, "GET", "/delete_image/abc123", "").await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_store_fault_is_server_error() {
        let state = Arc::new(AppState::new(Arc::new(UnreachableStore)));

        let resp = call(&state, "GET", "/images", "").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = call(&state, "POST", "/add_image", r#"{"url": "http://x/1.png"}"#).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let resp = call(&state, "DELETE", "/delete_image/abc123", "").await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(&resp),
            json!({"detail": "Internal Server Error"})
        );
    }
}
