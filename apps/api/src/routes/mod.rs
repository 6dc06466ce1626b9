pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::flows::handlers as flows;
use crate::questions::handlers as questions;
use crate::sessions::handlers as sessions;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/question-banks",
            post(questions::handle_parse_upload),
        )
        // Sessions
        .route("/api/v1/sessions", post(sessions::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(sessions::handle_get_session).delete(sessions::handle_delete_session),
        )
        .route("/api/v1/sessions/:id/upload", post(sessions::handle_upload))
        .route("/api/v1/sessions/:id/role", post(sessions::handle_select_role))
        .route(
            "/api/v1/sessions/:id/answer",
            post(sessions::handle_submit_answer),
        )
        .route(
            "/api/v1/sessions/:id/learning-plan",
            post(sessions::handle_learning_plan),
        )
        .route(
            "/api/v1/sessions/:id/next",
            post(sessions::handle_next_question),
        )
        .route(
            "/api/v1/sessions/:id/try-again",
            post(sessions::handle_try_again),
        )
        .route(
            "/api/v1/sessions/:id/start-over",
            post(sessions::handle_start_over),
        )
        .route("/api/v1/sessions/:id/mcq", post(sessions::handle_session_mcq))
        .route(
            "/api/v1/sessions/:id/narration",
            post(sessions::handle_session_narration),
        )
        .route(
            "/api/v1/sessions/:id/learning-path",
            post(sessions::handle_session_learning_path),
        )
        // Stateless flows
        .route(
            "/api/v1/flows/assess-answer",
            post(flows::handle_assess_answer),
        )
        .route(
            "/api/v1/flows/learning-plan",
            post(flows::handle_learning_plan),
        )
        .route(
            "/api/v1/flows/learning-path",
            post(flows::handle_learning_path),
        )
        .route("/api/v1/flows/study-guide", post(flows::handle_study_guide))
        .route("/api/v1/flows/skills", post(flows::handle_role_skills))
        .route("/api/v1/flows/mcq", post(flows::handle_mcq))
        .route("/api/v1/flows/narration", post(flows::handle_narration))
        .layer(body_limit)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::llm_client::testing::ScriptedModel;
    use crate::sessions::inflight::InFlight;
    use crate::sessions::machine::Session;
    use crate::sessions::store::{InMemorySessionStore, SessionStore};
    use crate::speech::testing::FixedSpeech;
    use crate::speech::SpeechSynthesizer;

    const BOUNDARY: &str = "interview-coach-boundary";
    const BANK_CSV: &str = "Question,Expected Answer,Difficulty\n\
                            What is ownership?,Each value has one owner,Easy\n\
                            Explain lifetimes.,,Hard\n";

    fn test_config() -> Config {
        Config {
            anthropic_api_key: "test-key".to_string(),
            gemini_api_key: None,
            redis_url: None,
            session_ttl_secs: 3600,
            max_upload_bytes: 1024 * 1024,
            port: 0,
            rust_log: "info".to_string(),
        }
    }

    fn app_with_config(
        model: ScriptedModel,
        speech: Option<Arc<dyn SpeechSynthesizer>>,
        config: Config,
    ) -> Router {
        build_router(AppState {
            llm: Arc::new(model),
            speech,
            sessions: Arc::new(InMemorySessionStore::new(config.session_ttl_secs)),
            inflight: InFlight::default(),
            config,
        })
    }

    fn app_with(model: ScriptedModel, speech: Option<Arc<dyn SpeechSynthesizer>>) -> Router {
        app_with_config(model, speech, test_config())
    }

    fn app(model: ScriptedModel) -> Router {
        app_with(model, None)
    }

    fn multipart_request(uri: &str, file_name: &str, contents: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             {contents}\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_post(uri: &str) -> Request<Body> {
        Request::post(uri).body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn create_session(app: &Router) -> String {
        let (status, body) = send(app, empty_post("/api/v1/sessions")).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["view"], "upload");
        body["id"].as_str().unwrap().to_string()
    }

    async fn session_at_first_question(app: &Router) -> String {
        let id = create_session(app).await;
        let (status, _) = send(
            app,
            multipart_request(&format!("/api/v1/sessions/{id}/upload"), "Acme.csv", BANK_CSV),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(
            app,
            json_request(&format!("/api/v1/sessions/{id}/role"), json!({"role": "Acme"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        id
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(
            &app(ScriptedModel::new()),
            Request::get("/health").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "interview-coach");
        assert_eq!(body["speech"], false);
        assert_eq!(body["session_store"], "memory");
    }

    #[tokio::test]
    async fn test_question_bank_preview() {
        let (status, body) = send(
            &app(ScriptedModel::new()),
            multipart_request("/api/v1/question-banks", "Acme.csv", BANK_CSV),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["company"], "Acme");
        assert_eq!(body["roles"][0]["questions"].as_array().unwrap().len(), 2);
        assert_eq!(body["roles"][0]["questions"][0]["difficulty"], "Easy");
    }

    #[tokio::test]
    async fn test_upload_rejects_unknown_file_type() {
        let (status, body) = send(
            &app(ScriptedModel::new()),
            multipart_request("/api/v1/question-banks", "notes.txt", "hello"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"],
            "Invalid file type. Please upload a .xlsx or .csv file."
        );
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected() {
        let config = Config {
            max_upload_bytes: 64,
            ..test_config()
        };
        let app = app_with_config(ScriptedModel::new(), None, config);
        let contents = format!("Question\n{}\n", "Why? ".repeat(200));

        let (status, body) = send(
            &app,
            multipart_request("/api/v1/question-banks", "Acme.csv", &contents),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_weak_answer_walkthrough() {
        let model = ScriptedModel::new()
            .with_response(r#"{"score": 40, "strengths": "Names the concept", "gaps": "No mention of moves"}"#)
            .with_response(
                json!({"learning_plan": "### Moves\nRead the ownership chapter."}).to_string(),
            )
            .with_response(r#"{"score": 90, "strengths": "Complete", "gaps": ""}"#);
        let app = app(model);
        let id = session_at_first_question(&app).await;

        let (status, body) = send(
            &app,
            json_request(
                &format!("/api/v1/sessions/{id}/answer"),
                json!({"answer": "Values have owners"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"], "feedback");
        assert_eq!(body["assessment"]["score"], 40);
        assert_eq!(body["can_request_learning_plan"], true);

        let (status, body) =
            send(&app, empty_post(&format!("/api/v1/sessions/{id}/learning-plan"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"], "learning");
        assert!(body["learning_plan"].as_str().unwrap().contains("Moves"));

        let (_, body) = send(&app, empty_post(&format!("/api/v1/sessions/{id}/try-again"))).await;
        assert_eq!(body["view"], "assessment");
        assert_eq!(body["question_index"], 0);
        assert!(body["assessment"].is_null());

        let (_, body) = send(
            &app,
            json_request(
                &format!("/api/v1/sessions/{id}/answer"),
                json!({"answer": "Each value has exactly one owner; moves transfer it"}),
            ),
        )
        .await;
        assert_eq!(body["can_request_learning_plan"], false);

        let (_, body) = send(&app, empty_post(&format!("/api/v1/sessions/{id}/next"))).await;
        assert_eq!(body["view"], "assessment");
        assert_eq!(body["question_index"], 1);
        assert_eq!(body["current_question"]["question"], "Explain lifetimes.");
    }

    #[tokio::test]
    async fn test_blank_answer_is_rejected_without_calling_model() {
        let app = app(ScriptedModel::new());
        let id = session_at_first_question(&app).await;

        let (status, body) = send(
            &app,
            json_request(&format!("/api/v1/sessions/{id}/answer"), json!({"answer": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"]["message"],
            "Please provide an answer before submitting."
        );

        let (_, body) = send(
            &app,
            Request::get(format!("/api/v1/sessions/{id}")).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(body["view"], "assessment");
    }

    #[tokio::test]
    async fn test_failed_assessment_keeps_view() {
        let app = app(ScriptedModel::new().with_response("not json"));
        let id = session_at_first_question(&app).await;

        let (status, body) = send(
            &app,
            json_request(&format!("/api/v1/sessions/{id}/answer"), json!({"answer": "Owners"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "LLM_ERROR");

        let (_, body) = send(
            &app,
            Request::get(format!("/api/v1/sessions/{id}")).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(body["view"], "assessment");
        assert!(body["assessment"].is_null());
    }

    #[tokio::test]
    async fn test_out_of_order_transition_conflicts() {
        let app = app(ScriptedModel::new());
        let id = create_session(&app).await;

        let (status, body) = send(&app, empty_post(&format!("/api/v1/sessions/{id}/next"))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let app = app(ScriptedModel::new());
        let id = uuid::Uuid::new_v4();

        let (status, _) = send(
            &app,
            Request::get(format!("/api/v1/sessions/{id}")).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            Request::delete(format!("/api/v1/sessions/{id}")).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reading_a_session_refreshes_its_expiry() {
        let store = Arc::new(InMemorySessionStore::new(60));
        let app = build_router(AppState {
            llm: Arc::new(ScriptedModel::new()),
            speech: None,
            sessions: store.clone(),
            inflight: InFlight::default(),
            config: test_config(),
        });

        let mut session = Session::new();
        session.updated_at = chrono::Utc::now() - chrono::Duration::seconds(50);
        store.save(&session).await.unwrap();

        let (status, _) = send(
            &app,
            Request::get(format!("/api/v1/sessions/{}", session.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let refreshed = store.load(session.id).await.unwrap().unwrap();
        assert!(refreshed.updated_at > session.updated_at + chrono::Duration::seconds(40));
    }

    #[tokio::test]
    async fn test_delete_session() {
        let app = app(ScriptedModel::new());
        let id = create_session(&app).await;

        let (status, _) = send(
            &app,
            Request::delete(format!("/api/v1/sessions/{id}")).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(
            &app,
            Request::get(format!("/api/v1/sessions/{id}")).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_start_over_returns_to_upload() {
        let app = app(ScriptedModel::new());
        let id = session_at_first_question(&app).await;

        let (status, body) =
            send(&app, empty_post(&format!("/api/v1/sessions/{id}/start-over"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["view"], "upload");
        assert!(body["company"].is_null());
        assert_eq!(body["roles"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_session_mcq_uses_current_question() {
        let model = ScriptedModel::new().with_response(
            r#"{"question": "Who owns a value?", "options": ["One owner", "Everyone", "The heap"], "correct_answer": "one owner"}"#,
        );
        let app = app(model);
        let id = session_at_first_question(&app).await;

        let (status, body) = send(&app, empty_post(&format!("/api/v1/sessions/{id}/mcq"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["correct_answer"], "One owner");
        assert_eq!(body["options"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_narration_without_speech_is_unavailable() {
        let (status, body) = send(
            &app(ScriptedModel::new()),
            json_request("/api/v1/flows/narration", json!({"text": "Hello"})),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "SPEECH_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_narration_returns_wav_data_uri() {
        let speech: Arc<dyn SpeechSynthesizer> = Arc::new(FixedSpeech(vec![0, 0, 1, 0]));
        let (status, body) = send(
            &app_with(ScriptedModel::new(), Some(speech)),
            json_request("/api/v1/flows/narration", json!({"text": "Hello"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["media"]
            .as_str()
            .unwrap()
            .starts_with("data:audio/wav;base64,"));
    }

    #[tokio::test]
    async fn test_stateless_skills_flow() {
        let model =
            ScriptedModel::new().with_response(r#"{"skills": ["SQL", "Python", "sql"]}"#);
        let (status, body) = send(
            &app(model),
            json_request(
                "/api/v1/flows/skills",
                json!({"role_name": "Data Analyst", "company_name": "Acme"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["skills"], json!(["SQL", "Python"]));
    }

    #[tokio::test]
    async fn test_stateless_learning_path_includes_markdown() {
        let model = ScriptedModel::new().with_response(
            r#"{"skills": [{"name": "SQL", "description": "Query data.", "resources": [
                {"title": "SQLBolt", "url": "https://sqlbolt.com"},
                {"title": "Mode", "url": "https://mode.com/sql-tutorial"}
            ]}]}"#,
        );
        let (status, body) = send(
            &app(model),
            json_request(
                "/api/v1/flows/learning-path",
                json!({"role_name": "Analyst", "company_name": "Acme", "questions": ["Join two tables"]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["skills"][0]["name"], "SQL");
        assert!(body["markdown"]
            .as_str()
            .unwrap()
            .starts_with("### SQL\nQuery data.\n"));
    }
}
