use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::{self, Body, Bytes};
use axum::extract::Request;
use axum::http::{Method, header};
use axum::response::{IntoResponse, Response};
use eyre::ContextCompat;
use futures::future::BoxFuture;
use shuttle_runtime::SecretStore;
use tower::{Layer, Service};
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::credentials::Credential;
use crate::error::Rejection;

const ACCESS_TOKEN_PARAM: &str = "access_token";
/// Upper bound on a form body read while looking for `access_token`.
const MAX_FORM_BODY: usize = 10 << 20;

/// Builds an [`AuthGate`] around every service it is applied to.
///
/// Cheaply cloneable.
#[derive(Clone)]
pub struct AuthGateLayer {
    token: Arc<str>,
}

impl AuthGateLayer {
    pub fn new(token: impl Into<Arc<str>>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Reads the shared token from the `ACCESS_TOKEN` secret.
    pub fn from_secrets(secrets: &SecretStore) -> eyre::Result<Self> {
        let token = secrets
            .get("ACCESS_TOKEN")
            .context("ACCESS_TOKEN secret is not set")?;
        Ok(Self::new(token))
    }
}

impl<S> Layer<S> for AuthGateLayer {
    type Service = AuthGate<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthGate::new(inner, self.token.clone())
    }
}

/// Refuses requests that do not present the shared token.
///
/// The token is looked for, in order, in:
///   1. an `Authorization: Bearer <token>` header
///   2. an `Authorization: Basic <base64(user:token)>` header, any user
///   3. an `access_token` form or query parameter, which is what browsers'
///      `EventSource` can send
///
/// Authorised requests reach `inner` untouched. Everything else gets a 401
/// with the reason as a plain-text body.
#[derive(Clone)]
pub struct AuthGate<S> {
    inner: S,
    token: Arc<str>,
}

impl<S> AuthGate<S> {
    pub fn new(inner: S, token: impl Into<Arc<str>>) -> Self {
        Self {
            inner,
            token: token.into(),
        }
    }
}

impl<S> Service<Request> for AuthGate<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let token = self.token.clone();
        // `self.inner` is the instance that was polled ready, it has to take this call
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            match authorize(request, &token).await {
                Ok(request) => inner.call(request).await,
                Err(rejection) => {
                    warn!(reason = %rejection, "Unauthorised");
                    Ok(rejection.into_response())
                }
            }
        })
    }
}

async fn authorize(request: Request, token: &str) -> Result<Request, Rejection> {
    let (request, credential) = match Credential::from_headers(request.headers())? {
        Some(credential) => (request, credential),
        None => {
            let (request, value) = form_value(request, ACCESS_TOKEN_PARAM).await;
            (request, Credential::AccessToken(value))
        }
    };

    if !credential.matches(token) {
        return Err(credential.rejection());
    }
    if let Credential::Basic(basic) = &credential {
        debug!(
            username = %String::from_utf8_lossy(&basic.username),
            "basic credentials accepted"
        );
    }
    debug!(scheme = credential.scheme(), "authorised");
    Ok(request)
}

/// First value of `name` among the request's form fields, body fields first
/// and then the query string.
///
/// A consumed body is put back so the downstream service sees the same bytes.
/// A body that cannot be read, or is larger than [`MAX_FORM_BODY`], adds no
/// fields and reaches the downstream service empty.
async fn form_value(request: Request, name: &str) -> (Request, Option<String>) {
    let query_value = |request: &Request| {
        first_value(request.uri().query().unwrap_or_default().as_bytes(), name)
    };
    if !carries_form(&request) {
        let value = query_value(&request);
        return (request, value);
    }

    let (parts, body) = request.into_parts();
    let bytes = match body::to_bytes(body, MAX_FORM_BODY).await {
        Ok(bytes) => bytes,
        Err(err) => {
            debug!("cannot read form body: {err}");
            Bytes::new()
        }
    };
    let request = Request::from_parts(parts, Body::from(bytes.clone()));
    let value = first_value(&bytes, name).or_else(|| query_value(&request));
    (request, value)
}

fn carries_form(request: &Request) -> bool {
    let is_form = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| {
            mime.trim()
                .eq_ignore_ascii_case("application/x-www-form-urlencoded")
        });
    is_form && matches!(*request.method(), Method::POST | Method::PUT | Method::PATCH)
}

fn first_value(input: &[u8], name: &str) -> Option<String> {
    form_urlencoded::parse(input)
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
