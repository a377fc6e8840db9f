pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::resume::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/parse-resume", post(handlers::handle_parse_resume))
        // legacy path kept for older clients
        .route("/parse-resume", post(handlers::handle_parse_resume))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::fake::FakeGateway;
    use crate::resume::classify::{EmploymentClassifier, InternshipPolicy};
    use crate::resume::extractor::PdfMode;
    use crate::resume::intervals::DurationFormat;
    use crate::resume::normalizer::{NormalizeOptions, ResumeNormalizer};

    const BOUNDARY: &str = "resume-test-boundary";

    const COMPLETION: &str = r#"{
        "personalInfo": { "fullName": "Jane Q Doe", "email": "jane@example.com" },
        "work": { "skills": ["Rust"] },
        "experienceDetails": [
            { "organization": "Initech", "designation": "Engineer", "fromDate": "01/2015", "toDate": "12/2016" },
            { "organization": "Acme", "designation": "Summer Intern", "fromDate": "06/2014", "toDate": "08/2014" }
        ],
        "educationDetails": [{ "degree": "B.Sc", "year": "2014" }],
        "noticePeriod": "N/A"
    }"#;

    fn test_config(upload_dir: &Path) -> Config {
        Config {
            anthropic_api_key: "test-key".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            upload_dir: upload_dir.to_path_buf(),
            max_upload_bytes: 1024 * 1024,
            pdf_mode: PdfMode::ExtractText,
            experience_format: DurationFormat::YearsMonths,
            internship_policy: InternshipPolicy::Retain,
            internship_keywords: vec!["intern".to_string()],
            allow_raw_completion: false,
        }
    }

    fn app_with(gateway: Arc<FakeGateway>, config: Config) -> Router {
        let normalizer = ResumeNormalizer::new(
            EmploymentClassifier::new(&config.internship_keywords),
            NormalizeOptions {
                duration_format: config.experience_format,
                internship_policy: config.internship_policy,
            },
        );
        build_router(AppState {
            gateway,
            normalizer: Arc::new(normalizer),
            config,
        })
    }

    fn multipart_body(field: &str, file_name: &str, content: &str) -> Body {
        Body::from(format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             {content}\r\n\
             --{BOUNDARY}--\r\n"
        ))
    }

    fn post(uri: &str, content_type: &str, body: Body) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        post(uri, "application/json", Body::from(body.to_string()))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(Arc::new(FakeGateway::replying("{}")), test_config(dir.path()));
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_json_resume_text_is_parsed_and_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(FakeGateway::replying(COMPLETION));
        let app = app_with(gateway.clone(), test_config(dir.path()));

        let (status, body) = send(
            app,
            post_json("/api/parse-resume", json!({ "resumeText": "Jane Q Doe, engineer" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body.get("raw").is_none());
        let data = &body["data"];
        assert_eq!(data["work"]["experienceInYears"], "2Y-0M");
        assert_eq!(data["work"]["currentStatus"], "Unemployed");
        assert_eq!(data["work"]["currentEmployer"], "Initech");
        assert_eq!(data["personalInfo"]["firstName"], "Jane");
        assert_eq!(data["personalInfo"]["lastName"], "Doe");
        assert_eq!(data["experienceDetails"].as_array().unwrap().len(), 2);
        assert!(gateway.calls()[0].prompt.contains("Jane Q Doe, engineer"));
    }

    #[tokio::test]
    async fn test_text_file_upload_on_legacy_path() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(FakeGateway::replying(COMPLETION));
        let app = app_with(gateway.clone(), test_config(dir.path()));

        let request = post(
            "/parse-resume",
            &format!("multipart/form-data; boundary={BOUNDARY}"),
            multipart_body("resume", "cv.txt", "Jane Q Doe\nInitech 2015-2016"),
        );
        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["work"]["experienceInYears"], "2Y-0M");
        assert!(gateway.calls()[0].prompt.contains("Initech 2015-2016"));
        // staged upload is gone
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_docx_upload_is_rejected_without_model_call() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(FakeGateway::replying(COMPLETION));
        let app = app_with(gateway.clone(), test_config(dir.path()));

        let request = post(
            "/api/parse-resume",
            &format!("multipart/form-data; boundary={BOUNDARY}"),
            multipart_body("resume", "cv.docx", "PK"),
        );
        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "UNSUPPORTED_FORMAT");
        assert_eq!(body["supportedFormats"], json!([".pdf", ".txt"]));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_input_returns_usage() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(Arc::new(FakeGateway::replying("{}")), test_config(dir.path()));

        let (status, body) = send(app, post_json("/api/parse-resume", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["usage"].is_string());
    }

    #[tokio::test]
    async fn test_form_encoded_resume_text() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = Arc::new(FakeGateway::replying(COMPLETION));
        let app = app_with(gateway.clone(), test_config(dir.path()));

        let request = post(
            "/api/parse-resume",
            "application/x-www-form-urlencoded",
            Body::from("resumeText=Jane+Q+Doe"),
        );
        let (status, _) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(gateway.calls()[0].prompt.contains("Jane Q Doe"));
    }

    #[tokio::test]
    async fn test_malformed_completion_is_bad_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(
            Arc::new(FakeGateway::replying("Sorry, I cannot help with that.")),
            test_config(dir.path()),
        );

        let (status, body) =
            send(app, post_json("/api/parse-resume", json!({ "resumeText": "x" }))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "MALFORMED_COMPLETION");
    }

    #[tokio::test]
    async fn test_malformed_completion_raw_passthrough() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.allow_raw_completion = true;
        let app = app_with(
            Arc::new(FakeGateway::replying("Sorry, I cannot help with that.")),
            config,
        );

        let (status, body) =
            send(app, post_json("/api/parse-resume", json!({ "resumeText": "x" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["raw"], true);
        assert_eq!(body["data"], "Sorry, I cannot help with that.");
    }

    #[tokio::test]
    async fn test_gateway_failure_is_bad_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with(
            Arc::new(FakeGateway::failing(500, "upstream exploded")),
            test_config(dir.path()),
        );

        let (status, body) =
            send(app, post_json("/api/parse-resume", json!({ "resumeText": "x" }))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "LLM_ERROR");
    }
}
