use std::{collections::BTreeMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuccessBody {
    pub success: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Deserialize)]
pub struct StatusParams {
    #[serde(default)]
    pub body: String,
}

/// Request counts keyed by path.
pub type Hits = Arc<RwLock<BTreeMap<String, u64>>>;

pub fn app() -> Router {
    let hits: Hits = Arc::new(RwLock::new(BTreeMap::new()));
    Router::new()
        .route("/success", get(success))
        .route("/error-shaped", get(error_shaped))
        .route("/unparseable", get(unparseable))
        .route("/no-content", get(no_content))
        .route("/unauthorized", get(unauthorized))
        .route("/unauthorized-empty", get(unauthorized_empty))
        .route("/challenge", get(challenge))
        .route("/status/{code}", get(status))
        .route("/slow/{millis}", get(slow))
        .route("/hits", get(list_hits))
        .layer(middleware::from_fn_with_state(hits.clone(), count_hits))
        .with_state(hits)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn count_hits(State(hits): State<Hits>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if path != "/hits" {
        *hits.write().await.entry(path).or_default() += 1;
    }
    next.run(request).await
}

async fn list_hits(State(hits): State<Hits>) -> Json<BTreeMap<String, u64>> {
    Json(hits.read().await.clone())
}

async fn success() -> Json<SuccessBody> {
    Json(SuccessBody {
        success: "test".to_string(),
    })
}

async fn error_shaped() -> Json<ErrorBody> {
    Json(ErrorBody {
        error: "test".to_string(),
    })
}

async fn unparseable() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "abc": "test" }))
}

async fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn unauthorized() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorBody {
            error: "test".to_string(),
        }),
    )
}

async fn unauthorized_empty() -> StatusCode {
    StatusCode::UNAUTHORIZED
}

/// 401 with an auth challenge and a retry hint.
async fn challenge() -> impl IntoResponse {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Bearer"), (header::RETRY_AFTER, "30")],
        Json(ErrorBody {
            error: "test".to_string(),
        }),
    )
}

/// Respond with an arbitrary status and the `body` query parameter verbatim.
async fn status(Path(code): Path<u16>, Query(params): Query<StatusParams>) -> Result<Response, StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, params.body).into_response())
}

async fn slow(Path(millis): Path<u64>) -> Json<SuccessBody> {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    Json(SuccessBody {
        success: "slow".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_body_serializes_to_json() {
        let body = SuccessBody {
            success: "test".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "success": "test" }));
    }

    #[test]
    fn error_body_does_not_parse_as_success() {
        let result: Result<SuccessBody, _> = serde_json::from_str(r#"{"error":"test"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn status_params_default_to_empty_body() {
        let params: StatusParams = serde_json::from_str("{}").unwrap();
        assert!(params.body.is_empty());
    }
}
