//! Request signing
//!
//! Every request carries `Authorization: Lara {key_id}:{signature}` where the
//! signature is base64(HMAC-SHA1(secret, canonical)) and the canonical string is
//!
//! ```text
//! {method}\n{path_and_query}\n{content_md5}\n{content_type}\n{date}
//! ```
//!
//! `method` is the logical method (the `X-HTTP-Method-Override` value), not
//! the transport method.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha1::Sha1;

use crate::core::credentials::Credentials;
use crate::core::errors::{LaraError, Result};

type HmacSha1 = Hmac<Sha1>;

/// Signs requests with an access key pair
#[derive(Debug, Clone)]
pub struct RequestSigner {
    credentials: Credentials,
}

impl RequestSigner {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    pub fn access_key_id(&self) -> &str {
        self.credentials.access_key_id()
    }

    /// Signature of one request
    pub fn sign(
        &self,
        method: &str,
        path_and_query: &str,
        content_md5: &str,
        content_type: &str,
        date: &str,
    ) -> Result<String> {
        let canonical = format!("{method}\n{path_and_query}\n{content_md5}\n{content_type}\n{date}");

        let mut mac = HmacSha1::new_from_slice(self.credentials.access_key_secret().as_bytes())
            .map_err(|e| LaraError::Credentials {
                message: format!("unusable access key secret: {e}"),
            })?;
        mac.update(canonical.as_bytes());

        Ok(STANDARD.encode(mac.finalize().into_bytes()))
    }

    /// Full `Authorization` header value
    pub fn authorization(
        &self,
        method: &str,
        path_and_query: &str,
        content_md5: &str,
        content_type: &str,
        date: &str,
    ) -> Result<String> {
        let signature = self.sign(method, path_and_query, content_md5, content_type, date)?;
        Ok(format!("Lara {}:{}", self.access_key_id(), signature))
    }
}

/// Hex MD5 of a request body, as sent in `Content-MD5`
pub fn content_md5(body: &[u8]) -> String {
    hex::encode(Md5::digest(body))
}

/// `Date` header value, e.g. `Tue, 01 Oct 2024 10:00:00 +0000`
pub fn http_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S +0000").to_string()
}
