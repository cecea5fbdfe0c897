//! Acting-principal extraction.
//!
//! Every mutating call receives an explicit principal; there is no
//! ambient current-user state. Authentication itself is handled
//! upstream (out of scope here); the gateway forwards the principal
//! in the `X-Actor-Id` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use tradewind_shared::types::ActorId;

/// Header carrying the acting principal's id.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// The acting principal for a mutating request.
#[derive(Debug, Clone, Copy)]
pub struct Principal {
    /// The actor's identity.
    pub actor: ActorId,
}

impl Principal {
    /// Returns the actor id.
    #[must_use]
    pub const fn actor_id(&self) -> ActorId {
        self.actor
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| rejection("Missing X-Actor-Id header"))?;

        let actor = header
            .parse::<ActorId>()
            .map_err(|_| rejection("X-Actor-Id is not a valid UUID"))?;

        Ok(Self { actor })
    }
}

fn rejection(message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "unauthorized",
            "message": message,
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/documents");
        if let Some(value) = value {
            builder = builder.header(ACTOR_HEADER, value);
        }
        let (parts, _) = builder.body(Body::empty()).unwrap().into_parts();
        parts
    }

    #[tokio::test]
    async fn test_valid_actor_header_is_accepted() {
        let actor = ActorId::new();
        let mut parts = parts_with_header(Some(&actor.to_string()));
        let principal = Principal::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(principal.actor_id(), actor);
    }

    #[tokio::test]
    async fn test_missing_header_is_rejected() {
        let mut parts = parts_with_header(None);
        let (status, _) = Principal::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_header_is_rejected() {
        let mut parts = parts_with_header(Some("not-a-uuid"));
        let (status, _) = Principal::from_request_parts(&mut parts, &())
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
