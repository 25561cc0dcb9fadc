use axum::extract::{Json, State};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use common::verify::{verify, Verification, INVALID_CODE_MESSAGE};

use crate::http_server::auth::token_cookie;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyCodeRequest {
    /// Access code as typed by the visitor
    #[serde(default)]
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyCodeResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    jar: CookieJar,
    Json(req): Json<VerifyCodeRequest>,
) -> (CookieJar, Json<VerifyCodeResponse>) {
    let verification = verify(state.registry(), &req.code);
    let redirect = verification.redirect_target();

    match verification {
        Verification::Accepted { token, directory } => {
            tracing::info!(%directory, "access code accepted");
            let response = VerifyCodeResponse {
                valid: true,
                redirect,
                message: None,
            };
            (jar.add(token_cookie(&token)), Json(response))
        }
        Verification::Rejected => {
            tracing::debug!("access code rejected");
            let response = VerifyCodeResponse {
                valid: false,
                redirect: None,
                message: Some(INVALID_CODE_MESSAGE.to_string()),
            };
            (jar, Json(response))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use common::lister::DirectoryLister;
    use common::registry::CodeRegistry;
    use tempfile::TempDir;

    use super::*;
    use crate::http_server::auth::AUTH_COOKIE_NAME;
    use crate::http_server::rate_limit::RateLimiter;

    async fn state(dir: &TempDir) -> ServiceState {
        let registry = CodeRegistry::from_pairs([("ABC123", "family")]).unwrap();
        let lister = DirectoryLister::new(dir.path()).await.unwrap();
        let limiter = RateLimiter::new(Duration::from_secs(900), 10);
        ServiceState::new(registry, lister, limiter)
    }

    #[tokio::test]
    async fn test_handler_accepts_normalized_code() {
        let dir = TempDir::new().unwrap();
        let (jar, Json(response)) = handler(
            State(state(&dir).await),
            CookieJar::new(),
            Json(VerifyCodeRequest {
                code: " abc123 ".into(),
            }),
        )
        .await;

        assert!(response.valid);
        assert_eq!(response.redirect.as_deref(), Some("/letters/family"));
        assert_eq!(response.message, None);
        assert_eq!(jar.get(AUTH_COOKIE_NAME).unwrap().value(), "ABC123");
    }

    #[tokio::test]
    async fn test_handler_rejects_unknown_code() {
        let dir = TempDir::new().unwrap();
        let (jar, Json(response)) = handler(
            State(state(&dir).await),
            CookieJar::new(),
            Json(VerifyCodeRequest {
                code: "nope".into(),
            }),
        )
        .await;

        assert!(!response.valid);
        assert_eq!(response.redirect, None);
        assert_eq!(response.message.as_deref(), Some(INVALID_CODE_MESSAGE));
        assert!(jar.get(AUTH_COOKIE_NAME).is_none());
    }

    #[test]
    fn test_missing_code_field_is_empty() {
        let req: VerifyCodeRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.code, "");
    }

    #[test]
    fn test_rejected_response_shape() {
        let response = VerifyCodeResponse {
            valid: false,
            redirect: None,
            message: Some(INVALID_CODE_MESSAGE.to_string()),
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({"valid": false, "message": "Invalid code. Please try again."})
        );
    }
}
