use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use httpmock::prelude::*;
use serde_json::{json, Value};
use sinacor_gpt::{build_router, AppConfig, AppState};
use std::collections::HashMap;
use tower::ServiceExt;

const SEARCH_PATH: &str = "/indexes/sinacor-index/docs/search";
const CHAT_PATH: &str = "/openai/deployments/gpt-4o/chat/completions";
const EMBEDDINGS_PATH: &str = "/openai/deployments/text-embedding-3-small/embeddings";

fn config_for(server: &MockServer, extra: &[(&str, &str)]) -> AppConfig {
    let mut settings: HashMap<String, String> = [
        ("AZURE_SEARCH_ENDPOINT", server.base_url()),
        ("AZURE_SEARCH_INDEX_NAME", "sinacor-index".to_string()),
        ("AZURE_SEARCH_ADMIN_KEY", "search-key".to_string()),
        ("AZURE_OPENAI_ENDPOINT", server.base_url()),
        ("AZURE_OPENAI_API_KEY", "openai-key".to_string()),
        ("AZURE_OPENAI_DEPLOYMENT_NAME", "gpt-4o".to_string()),
        ("AZURE_OPENAI_MODEL", "gpt-4o".to_string()),
        (
            "AZURE_OPENAI_EMBEDDINGS_DEPLOYMENT_NAME",
            "text-embedding-3-small".to_string(),
        ),
        ("OPENAI_API_VERSION", "2024-06-01".to_string()),
        ("HTTP_RETRY_ATTEMPTS", "0".to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    for (key, value) in extra {
        settings.insert(key.to_string(), value.to_string());
    }

    AppConfig::from_lookup(|key| settings.get(key).cloned()).unwrap()
}

fn router_for(server: &MockServer, extra: &[(&str, &str)]) -> Router {
    build_router(AppState::from_config(&config_for(server, extra)))
}

fn post(uri: &str, user_id: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(user_id) = user_id {
        builder = builder.header("user-id", user_id);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn send_json(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(router, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn mock_search(server: &MockServer) -> httpmock::Mock<'_> {
    server.mock(|when, then| {
        when.method(POST)
            .path(SEARCH_PATH)
            .query_param("api-version", "2023-11-01")
            .header("api-key", "search-key");
        then.status(200).json_body(json!({
            "value": [
                {"content": "O Sinacor é a plataforma de back-office.", "sourcepage": "manual.pdf"},
                {"content": "Ordens são registradas no módulo de bolsa."}
            ]
        }));
    })
}

fn mock_chat<'a>(server: &'a MockServer, answer: &str) -> httpmock::Mock<'a> {
    let answer = answer.to_string();
    server.mock(move |when, then| {
        when.method(POST)
            .path(CHAT_PATH)
            .query_param("api-version", "2024-06-01")
            .header("api-key", "openai-key");
        then.status(200).json_body(json!({
            "id": "chatcmpl-123",
            "choices": [{
                "index": 0,
                "finish_reason": "stop",
                "message": {"role": "assistant", "content": answer}
            }],
            "usage": {"completion_tokens": 12, "prompt_tokens": 340, "total_tokens": 352}
        }));
    })
}

#[tokio::test]
async fn test_chat_returns_grounded_answer() {
    let server = MockServer::start();
    let search = mock_search(&server);
    let chat = mock_chat(&server, "O Sinacor é o sistema de back-office.");

    let (status, body) = send_json(
        router_for(&server, &[]),
        post(
            "/api/chat",
            Some("user-1"),
            json!({"messages": [
                {"role": "user", "content": "Olá"},
                {"role": "user", "content": "O que é o Sinacor?"}
            ]}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "chatcmpl-123");
    assert_eq!(body["choices"][0]["index"], 0);
    assert_eq!(body["choices"][0]["finish_reason"], "stop");
    assert_eq!(body["choices"][0]["message"]["role"], "assistant");
    assert_eq!(
        body["choices"][0]["message"]["content"],
        "O Sinacor é o sistema de back-office."
    );
    assert_eq!(body["usage"]["total_tokens"], 352);
    assert!(body["created"].as_i64().unwrap() > 0);

    // one search per message, one model call
    assert_eq!(search.hits(), 2);
    chat.assert();
}

#[tokio::test]
async fn test_chat_prompt_carries_search_context() {
    let server = MockServer::start();
    mock_search(&server);
    let chat = server.mock(|when, then| {
        when.method(POST)
            .path(CHAT_PATH)
            .body_contains("O Sinacor é a plataforma de back-office.")
            .body_contains("manual.pdf")
            .body_contains("O que é o Sinacor?");
        then.status(200).json_body(json!({
            "id": "chatcmpl-ctx",
            "choices": [{"finish_reason": "stop", "message": {"role": "assistant", "content": "ok"}}]
        }));
    });

    let (status, _) = send_json(
        router_for(&server, &[]),
        post(
            "/api/chat",
            Some("user-1"),
            json!({"messages": [{"role": "user", "content": "O que é o Sinacor?"}]}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    chat.assert();
}

#[tokio::test]
async fn test_chat_stream_returns_plain_text() {
    let server = MockServer::start();
    mock_search(&server);
    mock_chat(&server, "Resposta em streaming.");

    let response = router_for(&server, &[])
        .oneshot(post(
            "/api/chat",
            Some("user-1"),
            json!({"messages": [{"role": "user", "content": "Pergunta"}], "stream": true}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/plain; charset=utf-8"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(String::from_utf8(bytes.to_vec()).unwrap(), "Resposta em streaming.");
}

#[tokio::test]
async fn test_chat_requires_user_header() {
    let server = MockServer::start();
    let search = mock_search(&server);

    let (status, body) = send_json(
        router_for(&server, &[]),
        post(
            "/api/chat",
            None,
            json!({"messages": [{"role": "user", "content": "Olá"}]}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"detail": "O cabeçalho 'user-id' é obrigatório."}));
    assert_eq!(search.hits(), 0);
}

#[tokio::test]
async fn test_chat_rejects_empty_messages() {
    let server = MockServer::start();

    let (status, body) = send_json(
        router_for(&server, &[]),
        post("/api/chat", Some("user-1"), json!({"messages": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "A lista de mensagens não pode estar vazia.");

    let (status, body) = send_json(
        router_for(&server, &[]),
        post(
            "/api/chat",
            Some("user-1"),
            json!({"messages": [{"role": "user", "content": "ok"}, {"role": "user", "content": ""}]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["detail"],
        "O atributo 'content' da mensagem no índice 1 não pode estar vazio para /chat."
    );
}

#[tokio::test]
async fn test_chat_accepts_whitespace_content() {
    let server = MockServer::start();
    let search = mock_search(&server);
    let chat = mock_chat(&server, "ok");

    let (status, _) = send_json(
        router_for(&server, &[]),
        post(
            "/api/chat",
            Some("user-1"),
            json!({"messages": [{"role": "user", "content": "  "}]}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    search.assert();
    chat.assert();
}

#[tokio::test]
async fn test_chat_upstream_failure_is_internal_error() {
    let server = MockServer::start();
    mock_search(&server);
    server.mock(|when, then| {
        when.method(POST).path(CHAT_PATH);
        then.status(500).body("boom");
    });

    let (status, body) = send_json(
        router_for(&server, &[]),
        post(
            "/api/chat",
            Some("user-1"),
            json!({"messages": [{"role": "user", "content": "Olá"}]}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"detail": "Erro ao processar a solicitação de chat."}));
}

#[tokio::test]
async fn test_chat_malformed_body_is_unprocessable() {
    let server = MockServer::start();

    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .header("user-id", "user-1")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send_json(router_for(&server, &[]), request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["body"]));
}

fn completion_body(messages: Value) -> Value {
    json!({
        "data": {
            "params": {"streamIndicator": false, "userId": "0b0e5c3c-6f0e-4a43-9d0c-3b8d5c3f9a11"},
            "messages": messages
        }
    })
}

#[tokio::test]
async fn test_chat_completion_envelope() {
    let server = MockServer::start();
    mock_search(&server);
    mock_chat(&server, "Conclusão gerada.");

    let (status, body) = send_json(
        router_for(&server, &[]),
        post(
            "/api/chat/completion",
            Some("user-1"),
            completion_body(json!([
                {"roleName": "user", "messageContent": "O que é o Sinacor?", "endTurnIndicator": true}
            ])),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let details = &body["data"]["details"];
    assert_eq!(details["idCompletion"], "chatcmpl-123");
    assert_eq!(details["objectType"], "completion");
    assert_eq!(details["usage"]["completionTokenCount"], 12);
    assert_eq!(details["usage"]["promptTokenCount"], 340);
    assert_eq!(details["usage"]["totalTokenCount"], 352);

    let choice = &body["data"]["choices"][0];
    assert_eq!(choice["chatCompletionChoiceCommon"]["indexOption"], 0);
    assert_eq!(choice["chatCompletionChoiceCommon"]["finishReason"], "stop");
    assert_eq!(choice["message"]["roleName"], "assistant");
    assert_eq!(choice["message"]["messageContent"], "Conclusão gerada.");
    assert_eq!(choice["message"]["endTurnIndicator"], true);
}

#[tokio::test]
async fn test_chat_completion_null_end_turn_indicator() {
    let server = MockServer::start();

    let (status, body) = send_json(
        router_for(&server, &[]),
        post(
            "/api/chat/completion",
            Some("user-1"),
            completion_body(json!([
                {"roleName": "user", "messageContent": "Olá", "endTurnIndicator": null}
            ])),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["detail"],
        "O atributo 'endTurnIndicator' da mensagem no índice 0 não pode ser vazio para /chat/completion."
    );
}

#[tokio::test]
async fn test_chat_completion_content_length_limits() {
    let server = MockServer::start();
    let too_long = "a".repeat(8001);

    let (status, body) = send_json(
        router_for(&server, &[]),
        post(
            "/api/chat/completion",
            Some("user-1"),
            completion_body(json!([{"roleName": "user", "messageContent": too_long}])),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["detail"][0]["loc"],
        json!(["body", "data", "messages", 0, "messageContent"])
    );
    assert_eq!(body["detail"][0]["type"], "string_too_long");
}

#[tokio::test]
async fn test_chat_completion_rejects_invalid_user_id() {
    let server = MockServer::start();

    let (status, _) = send_json(
        router_for(&server, &[]),
        post(
            "/api/chat/completion",
            Some("user-1"),
            json!({"data": {"params": {"userId": "not-a-uuid"}, "messages": [
                {"roleName": "user", "messageContent": "Olá"}
            ]}}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_chat_history_is_replayed_for_same_user() {
    let server = MockServer::start();
    mock_search(&server);
    let chat = server.mock(|when, then| {
        when.method(POST)
            .path(CHAT_PATH)
            .body_contains("Qual o primeiro passo?");
        then.status(200).json_body(json!({
            "id": "chatcmpl-hist",
            "choices": [{"finish_reason": "stop", "message": {"role": "assistant", "content": "Abrir o módulo."}}]
        }));
    });
    let router = router_for(&server, &[("CHAT_HISTORY_MAX_MESSAGES", "10")]);

    let (first, _) = send(
        router.clone(),
        post(
            "/api/chat",
            Some("user-7"),
            json!({"messages": [{"role": "user", "content": "Qual o primeiro passo?"}]}),
        ),
    )
    .await;
    let (second, _) = send(
        router,
        post(
            "/api/chat",
            Some("user-7"),
            json!({"messages": [{"role": "user", "content": "E depois?"}]}),
        ),
    )
    .await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(chat.hits(), 2);
}

#[tokio::test]
async fn test_semantic_hybrid_search_sends_vector_query() {
    let server = MockServer::start();
    let embeddings = server.mock(|when, then| {
        when.method(POST).path(EMBEDDINGS_PATH);
        then.status(200).json_body(json!({
            "data": [{"embedding": [0.1, 0.2, 0.3]}],
            "usage": {"prompt_tokens": 4, "total_tokens": 4}
        }));
    });
    let search = server.mock(|when, then| {
        when.method(POST)
            .path(SEARCH_PATH)
            .json_body_partial(r#"{"queryType": "semantic", "semanticConfiguration": "default"}"#)
            .body_contains("vectorQueries");
        then.status(200).json_body(json!({"value": []}));
    });
    mock_chat(&server, "ok");

    let (status, _) = send(
        router_for(&server, &[("AZURE_SEARCH_STRATEGY", "semantic_hybrid")]),
        post(
            "/api/chat",
            Some("user-1"),
            json!({"messages": [{"role": "user", "content": "Olá"}]}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    embeddings.assert();
    search.assert();
}

#[tokio::test]
async fn test_embeddings_created() {
    let server = MockServer::start();
    let upstream = server.mock(|when, then| {
        when.method(POST)
            .path(EMBEDDINGS_PATH)
            .header("api-key", "openai-key")
            .json_body_partial(r#"{"input": "primeiro\nsegundo", "dimensions": 3}"#);
        then.status(200).json_body(json!({
            "data": [{"embedding": [0.5, -0.25, 0.125]}],
            "usage": {"prompt_tokens": 6, "total_tokens": 6}
        }));
    });

    let (status, body) = send_json(
        router_for(&server, &[]),
        post(
            "/api/embeddings",
            Some("user-1"),
            json!({"input": ["primeiro", "segundo"], "dimensions": 3}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["embeddings"], json!([0.5, -0.25, 0.125]));
    assert_eq!(body["total_tokens"], 6);
    upstream.assert();
}

#[tokio::test]
async fn test_embeddings_validation() {
    let server = MockServer::start();

    let (status, body) = send_json(
        router_for(&server, &[]),
        post("/api/embeddings", None, json!({"input": "texto"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"detail": "O header user-id é obrigatório."}));

    let (status, body) = send_json(
        router_for(&server, &[]),
        post("/api/embeddings", Some("user-1"), json!({"input": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"detail": "A entrada não pode estar vazia."}));
}

#[tokio::test]
async fn test_embeddings_upstream_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(EMBEDDINGS_PATH);
        then.status(401).body("{\"error\": \"unauthorized\"}");
    });

    let (status, body) = send_json(
        router_for(&server, &[]),
        post("/api/embeddings", Some("user-1"), json!({"input": "texto"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"detail": "Erro ao criar embeddings."}));
}

#[tokio::test]
async fn test_health_reports_version() {
    let server = MockServer::start();

    let (status, body) = send_json(
        router_for(&server, &[("APP_VERSION", "v2.3.4")]),
        get("/health"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "service_status": "Healthy",
            "dependencies_status": "Healthy",
            "app_version": "v2.3.4"
        })
    );
}

#[tokio::test]
async fn test_openapi_document_and_unknown_routes() {
    let server = MockServer::start();

    let (status, body) = send_json(router_for(&server, &[]), get("/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "SinacorGPT | REST API");
    assert_eq!(body["info"]["version"], "v1.0.1");

    let (status, body) = send_json(router_for(&server, &[]), get("/api/unknown")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "Not Found"}));
}
