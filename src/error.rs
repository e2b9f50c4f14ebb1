use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failure to structure an `Authorization` header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("The authorization header is not set.")]
    MissingHeader,
    #[error("The authorization header is malformed.")]
    MalformedHeader,
    #[error("The basic authentication header is malformed.")]
    MalformedBasic,
}

/// Why the gate refused a request.
///
/// The display strings are sent verbatim as the 401 body, so clients may
/// match on them. Spelling included.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Invalid Access Token")]
    InvalidAccessToken,
    #[error("Malformed Basic Authorization crdentials")]
    MalformedBasic,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Mising or invalid access_token")]
    MissingAccessToken,
    #[error(transparent)]
    Header(#[from] AuthError),
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            [
                (
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("text/plain; charset=utf-8"),
                ),
                (
                    header::X_CONTENT_TYPE_OPTIONS,
                    HeaderValue::from_static("nosniff"),
                ),
            ],
            self.to_string(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_errors_keep_their_reason() {
        insta::assert_snapshot!(
            Rejection::from(AuthError::MalformedHeader),
            @"The authorization header is malformed."
        );
        insta::assert_snapshot!(AuthError::MissingHeader, @"The authorization header is not set.");
        insta::assert_snapshot!(
            AuthError::MalformedBasic,
            @"The basic authentication header is malformed."
        );
    }

    #[tokio::test]
    async fn rejection_is_plain_text_401() {
        let response = Rejection::MissingAccessToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        let body = axum::body::to_bytes(response.into_body(), 1024)
            .await
            .unwrap();
        insta::assert_snapshot!(String::from_utf8_lossy(&body), @"Mising or invalid access_token");
    }
}
