//! Token authentication middleware.
//!
//! Accepts `Authorization: token <t>`, `Authorization: Bearer <t>`, or a
//! `token=<t>` query parameter, the same forms a notebook server accepts.
//! With no token configured every request passes.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;
use crate::state::AppState;

/// Middleware: reject requests that do not present the configured token.
pub async fn require_token(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(expected) = state.token.as_deref() else {
        return next.run(req).await;
    };

    match presented_token(&req) {
        Some(token) if tokens_match(&token, expected) => next.run(req).await,
        Some(_) => ApiError::Forbidden("invalid token".to_string()).into_response(),
        None => ApiError::Forbidden("authentication required".to_string()).into_response(),
    }
}

/// Compares without short-circuiting on the first differing byte.
fn tokens_match(presented: &str, expected: &str) -> bool {
    presented.len() == expected.len()
        && presented
            .bytes()
            .zip(expected.bytes())
            .fold(0u8, |diff, (a, b)| diff | (a ^ b))
            == 0
}

fn presented_token(req: &Request) -> Option<String> {
    let from_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            v.strip_prefix("token ")
                .or_else(|| v.strip_prefix("Bearer "))
                .map(|t| t.trim().to_string())
        });
    from_header.or_else(|| req.uri().query().and_then(query_token))
}

fn query_token(query: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.strip_prefix("token="))
        .next()
        .and_then(|raw| urlencoding::decode(raw).ok())
        .map(|t| t.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(uri: &str, auth: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn reads_token_from_header_forms() {
        assert_eq!(
            presented_token(&request("/x", Some("token abc"))).as_deref(),
            Some("abc")
        );
        assert_eq!(
            presented_token(&request("/x", Some("Bearer abc"))).as_deref(),
            Some("abc")
        );
        assert_eq!(presented_token(&request("/x", Some("Basic abc"))), None);
    }

    #[test]
    fn token_comparison_checks_every_byte() {
        assert!(tokens_match("s3cret", "s3cret"));
        assert!(!tokens_match("s3creT", "s3cret"));
        assert!(!tokens_match("x3cret", "s3cret"));
        assert!(!tokens_match("s3cre", "s3cret"));
        assert!(!tokens_match("", "s3cret"));
    }

    #[test]
    fn reads_token_from_query() {
        assert_eq!(
            presented_token(&request("/x?package=p&token=a%2Bb", None)).as_deref(),
            Some("a+b")
        );
        assert_eq!(presented_token(&request("/x?package=p", None)), None);
    }
}
