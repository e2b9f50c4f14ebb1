use base64::Engine;
use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};

use crate::error::AuthError;

/// Standard alphabet with padding, lenient about non-zero trailing bits the
/// way most HTTP stacks decode Basic credentials.
const BASIC_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Username and password of the "Basic" scheme, as raw bytes.
///
/// See <https://datatracker.ietf.org/doc/html/rfc7617>
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Basic {
    pub username: Vec<u8>,
    pub password: Vec<u8>,
}

impl Basic {
    /// Decodes the credentials part of a `Basic` header, `base64("user:password")`.
    ///
    /// The decoded bytes must hold exactly one `:`, so passwords containing a
    /// colon are refused. Neither field has to be UTF-8.
    pub fn decode(credentials: &[u8]) -> Result<Self, AuthError> {
        let decoded = BASIC_ENGINE
            .decode(credentials)
            .map_err(|_| AuthError::MalformedBasic)?;

        let mut fields = decoded.split(|&b| b == b':');
        match (fields.next(), fields.next(), fields.next()) {
            (Some(username), Some(password), None) => Ok(Self {
                username: username.to_vec(),
                password: password.to_vec(),
            }),
            _ => Err(AuthError::MalformedBasic),
        }
    }
}
