use axum::{extract::State, Json};
use axum_extra::{
    headers::{authorization::Basic, Authorization},
    typed_header::TypedHeaderRejection,
    TypedHeader,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{errors::AppError, state::AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Exchanges HTTP Basic credentials for a signed access token.
pub async fn handle_token(
    State(app_state): State<AppState>,
    credentials: Result<TypedHeader<Authorization<Basic>>, TypedHeaderRejection>,
) -> Result<Json<TokenResponse>, AppError> {
    let TypedHeader(Authorization(basic)) =
        credentials.map_err(|_| AppError::MissingCredentials)?;
    if basic.username().is_empty() || basic.password().is_empty() {
        return Err(AppError::MissingCredentials);
    }

    let (token, user) = app_state
        .authenticator
        .new_token(basic.username(), basic.password())
        .await?;

    info!(user_id = %user.id, "token issued");
    Ok(Json(TokenResponse { token }))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use axum_extra::headers::{Authorization, HeaderMapExt};
    use tower::ServiceExt;

    use crate::errors::MSG_ADMIN_ONLY;
    use crate::routes::test_support::{error_message, json_body, request, test_app};
    use crate::utils::jwt::decode_jwt;

    fn basic_request(method: Method, email: &str, password: &str) -> Request<Body> {
        let mut req = Request::builder()
            .method(method)
            .uri("/api/v1/token")
            .body(Body::empty())
            .unwrap();
        req.headers_mut()
            .typed_insert(Authorization::basic(email, password));
        req
    }

    #[tokio::test]
    async fn test_token_issued_for_valid_credentials() {
        let app = test_app();
        let res = app
            .router
            .oneshot(basic_request(Method::POST, "user@example.com", "gophers"))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let token = json_body(res).await["token"].as_str().unwrap().to_string();
        let claims = decode_jwt(&token, &app.keys).unwrap();
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[tokio::test]
    async fn test_token_via_get() {
        let app = test_app();
        let res = app
            .router
            .oneshot(basic_request(Method::GET, "admin@example.com", "gophers"))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_token_wrong_password_and_unknown_user() {
        let app = test_app();
        for (email, password) in [
            ("user@example.com", "not-gophers"),
            ("ghost@example.com", "gophers"),
        ] {
            let res = app
                .router
                .clone()
                .oneshot(basic_request(Method::POST, email, password))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(error_message(res).await, "AuthenticationFailed");
        }
    }

    #[tokio::test]
    async fn test_token_without_basic_auth() {
        let app = test_app();
        let res = app
            .router
            .oneshot(request("POST", "/api/v1/token", None, None))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            error_message(res).await,
            "must provide email and password in Basic auth"
        );
    }

    #[tokio::test]
    async fn test_user_token_cannot_list_users() {
        let app = test_app();
        let res = app
            .router
            .clone()
            .oneshot(basic_request(Method::POST, "user@example.com", "gophers"))
            .await
            .unwrap();
        let token = json_body(res).await["token"].as_str().unwrap().to_string();

        let res = app
            .router
            .oneshot(request(
                "GET",
                "/api/v1/users",
                Some(&format!("Bearer {token}")),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(error_message(res).await, MSG_ADMIN_ONLY);
    }
}
