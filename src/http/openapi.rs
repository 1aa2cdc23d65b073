//! OpenAPI 3.1 description of the public routes.

use serde_json::{json, Value};

pub const API_TITLE: &str = "SinacorGPT | REST API";
pub const API_VERSION: &str = "v1.0.1";
const LOGO_URL: &str =
    "https://www.hawkia.com.br/assets/images/hwk-img-logo-horizontal-neg-escuro.svg";

fn bad_request() -> Value {
    json!({
        "description": "Bad Request",
        "content": {"application/json": {"schema": {"$ref": "#/components/schemas/HTTPError"}}}
    })
}

fn unprocessable() -> Value {
    json!({
        "description": "Validation Error",
        "content": {"application/json": {"schema": {"$ref": "#/components/schemas/HTTPValidationError"}}}
    })
}

fn user_header() -> Value {
    json!({
        "name": "user-id",
        "in": "header",
        "required": true,
        "schema": {"type": "string", "title": "User-Id"}
    })
}

fn json_body(schema: &str) -> Value {
    json!({
        "required": true,
        "content": {"application/json": {"schema": {"$ref": format!("#/components/schemas/{}", schema)}}}
    })
}

fn json_response(description: &str, schema: &str) -> Value {
    json!({
        "description": description,
        "content": {"application/json": {"schema": {"$ref": format!("#/components/schemas/{}", schema)}}}
    })
}

fn schemas() -> Value {
    let role = json!({"type": "string", "enum": ["user", "assistant", "system", "ai", "tool"]});
    let finish_reason = json!({"anyOf": [
        {"type": "string", "enum": ["stop", "length", "content_filter"]},
        {"type": "null"}
    ]});

    json!({
        "ChatRole": role,
        "ChatMessage": {
            "type": "object",
            "required": ["role"],
            "properties": {
                "content": {"anyOf": [{"type": "string"}, {"type": "null"}]},
                "role": {"$ref": "#/components/schemas/ChatRole"}
            }
        },
        "ChatRequest": {
            "type": "object",
            "required": ["messages"],
            "properties": {
                "messages": {"type": "array", "items": {"$ref": "#/components/schemas/ChatMessage"}},
                "stream": {"type": "boolean", "default": false}
            }
        },
        "ChatUsage": {
            "type": "object",
            "required": ["completion_tokens", "prompt_tokens", "total_tokens"],
            "properties": {
                "completion_tokens": {"type": "integer"},
                "prompt_tokens": {"type": "integer"},
                "total_tokens": {"type": "integer"}
            }
        },
        "ChatChoice": {
            "type": "object",
            "required": ["index", "message"],
            "properties": {
                "finish_reason": finish_reason,
                "index": {"type": "integer"},
                "message": {"$ref": "#/components/schemas/ChatMessage"}
            }
        },
        "ChatResponse": {
            "type": "object",
            "required": ["choices", "created", "usage"],
            "properties": {
                "choices": {"type": "array", "items": {"$ref": "#/components/schemas/ChatChoice"}},
                "created": {"type": "integer"},
                "id": {"anyOf": [{"type": "string"}, {"type": "null"}]},
                "usage": {"$ref": "#/components/schemas/ChatUsage"}
            }
        },
        "ApiChatMessage": {
            "type": "object",
            "required": ["roleName", "messageContent"],
            "properties": {
                "roleName": {"$ref": "#/components/schemas/ChatRole"},
                "messageContent": {"type": "string", "minLength": 1, "maxLength": 8000},
                "endTurnIndicator": {"anyOf": [{"type": "boolean"}, {"type": "null"}], "default": true}
            }
        },
        "ChatCompletionRequest": {
            "type": "object",
            "required": ["data"],
            "properties": {
                "data": {
                    "type": "object",
                    "required": ["params", "messages"],
                    "properties": {
                        "params": {
                            "type": "object",
                            "required": ["userId"],
                            "properties": {
                                "streamIndicator": {"type": "boolean", "default": false},
                                "userId": {"type": "string", "format": "uuid"}
                            }
                        },
                        "messages": {"type": "array", "items": {"$ref": "#/components/schemas/ApiChatMessage"}}
                    }
                }
            }
        },
        "ChatCompletionResponse": {
            "type": "object",
            "required": ["data"],
            "properties": {
                "data": {
                    "type": "object",
                    "required": ["details", "choices"],
                    "properties": {
                        "details": {
                            "type": "object",
                            "required": ["idCompletion", "createdDateTime", "usage"],
                            "properties": {
                                "idCompletion": {"type": "string"},
                                "objectType": {"type": "string", "default": "completion"},
                                "createdDateTime": {"type": "integer"},
                                "usage": {
                                    "type": "object",
                                    "properties": {
                                        "completionTokenCount": {"type": "integer"},
                                        "promptTokenCount": {"type": "integer"},
                                        "totalTokenCount": {"type": "integer"}
                                    }
                                }
                            }
                        },
                        "choices": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "chatCompletionChoiceCommon": {
                                        "type": "object",
                                        "properties": {
                                            "indexOption": {"type": "integer"},
                                            "finishReason": finish_reason
                                        }
                                    },
                                    "message": {"$ref": "#/components/schemas/ApiChatMessage"}
                                }
                            }
                        }
                    }
                }
            }
        },
        "EmbeddingRequest": {
            "type": "object",
            "required": ["input"],
            "properties": {
                "input": {"anyOf": [{"type": "string"}, {"type": "array", "items": {"type": "string"}}]},
                "encoding_format": {"anyOf": [{"type": "string"}, {"type": "null"}], "default": "float"},
                "dimensions": {"anyOf": [{"type": "integer"}, {"type": "null"}]}
            }
        },
        "EmbeddingResponse": {
            "type": "object",
            "required": ["embeddings", "total_tokens"],
            "properties": {
                "embeddings": {"type": "array", "items": {"type": "number"}},
                "total_tokens": {"type": "integer"}
            }
        },
        "HealthCheckResponse": {
            "type": "object",
            "properties": {
                "service_status": {"anyOf": [{"type": "string"}, {"type": "null"}]},
                "dependencies_status": {"anyOf": [{"type": "string"}, {"type": "null"}]},
                "app_version": {"anyOf": [{"type": "string"}, {"type": "null"}]}
            }
        },
        "HTTPError": {
            "type": "object",
            "properties": {"detail": {"type": "string"}}
        },
        "HTTPValidationError": {
            "type": "object",
            "properties": {
                "detail": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "loc": {"type": "array", "items": {"anyOf": [{"type": "string"}, {"type": "integer"}]}},
                            "msg": {"type": "string"},
                            "type": {"type": "string"}
                        }
                    }
                }
            }
        }
    })
}

pub fn create_openapi() -> Value {
    json!({
        "openapi": "3.1.0",
        "info": {
            "title": API_TITLE,
            "version": API_VERSION,
            "summary": "Referência da API REST do SinacorGPT",
            "description": "Crie interações, conclusões para mensagens de chat ou obtenha uma representação vetorial (embeddings) de uma determinada entrada que pode ser consumida por modelos ChatGPT do Azure OpenAI, utilizando dados sobre o Sinacor.",
            "x-logo": {"url": LOGO_URL}
        },
        "tags": [
            {"name": "chat", "description": "Operações relacionadas a interações e conclusões de chat."},
            {"name": "embeddings", "description": "Operações relacionadas a criação de embeddings."},
            {"name": "health", "description": "Operações relacionadas a health checks."}
        ],
        "paths": {
            "/api/chat": {
                "post": {
                    "tags": ["chat"],
                    "summary": "Obtém uma interação de chat.",
                    "description": "Este endpoint fornece uma interação de chat com base na solicitação de chat fornecida.",
                    "operationId": "create_chat_response",
                    "parameters": [user_header()],
                    "requestBody": json_body("ChatRequest"),
                    "responses": {
                        "200": json_response("A interação de chat gerada", "ChatResponse"),
                        "400": bad_request(),
                        "422": unprocessable()
                    }
                }
            },
            "/api/chat/completion": {
                "post": {
                    "tags": ["chat"],
                    "summary": "Obtém uma conclusão de chat.",
                    "description": "Este endpoint fornece uma conclusão de chat com base na solicitação de chat fornecida.",
                    "operationId": "create_chat_completion",
                    "parameters": [user_header()],
                    "requestBody": json_body("ChatCompletionRequest"),
                    "responses": {
                        "200": json_response("A conclusão de chat gerada", "ChatCompletionResponse"),
                        "400": bad_request(),
                        "422": unprocessable()
                    }
                }
            },
            "/api/embeddings": {
                "post": {
                    "tags": ["embeddings"],
                    "summary": "Cria embeddings para a entrada fornecida.",
                    "description": "Este endpoint fornece embeddings para a entrada fornecida.",
                    "operationId": "create_embeddings",
                    "parameters": [user_header()],
                    "requestBody": json_body("EmbeddingRequest"),
                    "responses": {
                        "201": json_response("Os embeddings gerados", "EmbeddingResponse"),
                        "400": bad_request(),
                        "422": unprocessable()
                    }
                }
            },
            "/health": {
                "get": {
                    "tags": ["health"],
                    "summary": "Verifica a saúde do serviço.",
                    "description": "Este endpoint verifica a saúde do serviço.",
                    "operationId": "get_health_check",
                    "responses": {
                        "200": json_response("O status de saúde do serviço", "HealthCheckResponse")
                    }
                }
            }
        },
        "components": {"schemas": schemas()}
    })
}
