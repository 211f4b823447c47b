pub mod health;
pub mod page;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::pipeline::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(page::index_handler))
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/optimize",
            post(handlers::handle_optimize).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::pipeline::testing::{Fakes, OPTIMIZED_TEXT, RESUME_TEXT};

    fn app() -> Router {
        let fakes = Fakes::new(Ok(RESUME_TEXT.to_string()), Ok(OPTIMIZED_TEXT.to_string()));
        build_router(fakes.app_state())
    }

    #[tokio::test]
    async fn test_index_serves_upload_form() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("Resume Optimizer"));
        assert!(html.contains("name=\"resume\""));
        assert!(html.contains("name=\"job_url\""));
        assert!(html.contains("optimized_resume.pdf"));
    }

    #[tokio::test]
    async fn test_health_reports_service() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "resume-optimizer");
    }

    #[tokio::test]
    async fn test_optimize_rejects_get() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/optimize")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
