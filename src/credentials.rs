use axum::http::{HeaderMap, header};
use subtle::ConstantTimeEq;

use crate::basic::Basic;
use crate::error::{AuthError, Rejection};

/// A single authorization attempt, as presented by the client.
///
/// Header credentials are kept as raw bytes: header values need not be UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// `Authorization: Bearer <token>`
    Bearer(Vec<u8>),
    /// `Authorization: Basic <base64(user:token)>`
    Basic(Basic),
    /// First `access_token` form or query value, if any.
    AccessToken(Option<String>),
}

impl Credential {
    /// Reads the credential carried by the `Authorization` header.
    ///
    /// `Ok(None)` means the header gives nothing to check, either because it
    /// is absent or because its scheme is not one we know. The caller then
    /// falls back to the `access_token` parameter.
    pub fn from_headers(headers: &HeaderMap) -> Result<Option<Self>, Rejection> {
        match parse_request(headers) {
            Ok((b"Bearer", token)) => Ok(Some(Self::Bearer(token.to_vec()))),
            Ok((b"Basic", encoded)) => Basic::decode(encoded)
                .map(|basic| Some(Self::Basic(basic)))
                .map_err(|_| Rejection::MalformedBasic),
            Ok(_) | Err(AuthError::MissingHeader) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    pub fn matches(&self, expected: &str) -> bool {
        match self {
            Self::Bearer(token) => same_token(token, expected),
            Self::Basic(basic) => same_token(&basic.password, expected),
            Self::AccessToken(Some(token)) => same_token(token.as_bytes(), expected),
            Self::AccessToken(None) => false,
        }
    }

    /// The refusal sent back when [`Credential::matches`] fails.
    pub fn rejection(&self) -> Rejection {
        match self {
            Self::Bearer(_) => Rejection::InvalidAccessToken,
            Self::Basic(_) => Rejection::InvalidCredentials,
            Self::AccessToken(_) => Rejection::MissingAccessToken,
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Bearer(_) => "bearer",
            Self::Basic(_) => "basic",
            Self::AccessToken(_) => "access_token",
        }
    }
}

fn same_token(presented: &[u8], expected: &str) -> bool {
    presented.ct_eq(expected.as_bytes()).into()
}

/// Extracts the first `Authorization` header and splits it into scheme and
/// credentials.
pub fn parse_request(headers: &HeaderMap) -> Result<(&[u8], &[u8]), AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .filter(|value| !value.is_empty())
        .ok_or(AuthError::MissingHeader)?;
    parse(value.as_bytes())
}

/// Splits an `Authorization` header value on its first space.
pub fn parse(value: &[u8]) -> Result<(&[u8], &[u8]), AuthError> {
    let space = value
        .iter()
        .position(|&b| b == b' ')
        .ok_or(AuthError::MalformedHeader)?;
    Ok((&value[..space], &value[space + 1..]))
}
