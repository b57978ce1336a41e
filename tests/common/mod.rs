//! Mock HTTP server helpers for integration tests

#![allow(dead_code)]

use lara_sdk::{ClientConfig, Credentials, Translator};
use mockito::{Matcher, ServerGuard};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const ACCESS_KEY_ID: &str = "AK123";

/// Translator pointed at the mock server
pub fn translator(server: &ServerGuard) -> Translator {
    let config = ClientConfig::default().with_server_url(server.url());
    Translator::new(Credentials::new(ACCESS_KEY_ID, "secret"), config)
        .expect("Failed to build translator")
}

/// Successful response envelope
pub fn content(value: Value) -> String {
    json!({"status": 200, "content": value}).to_string()
}

/// Error response envelope
pub fn error(status: u16, kind: &str, message: &str) -> String {
    json!({"status": status, "error": {"type": kind, "message": message}}).to_string()
}

/// `Authorization` header produced by the signer
pub fn signed() -> Matcher {
    Matcher::Regex(format!("^Lara {ACCESS_KEY_ID}:[A-Za-z0-9+/]+=*$"))
}

/// Replays `bodies` in order, repeating the last one
pub fn sequence(bodies: Vec<Value>) -> impl Fn(&mockito::Request) -> Vec<u8> + Send + Sync + 'static {
    let calls = Arc::new(AtomicUsize::new(0));
    move |_| {
        let call = calls.fetch_add(1, Ordering::SeqCst);
        let body = &bodies[call.min(bodies.len() - 1)];
        content(body.clone()).into_bytes()
    }
}
