use serde_json::Value;

use crate::api::{Dispatcher, API_VERSION};
use crate::http::request::Request;
use crate::http::response::ResponseHeaders;
use crate::server::RequestHandler;

/// Bridges the wire to the dispatcher: one assembled request in, one
/// fully serialized HTTP response out.
pub struct ApiService {
    dispatcher: Dispatcher,
    headers: ResponseHeaders,
}

impl ApiService {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            headers: ResponseHeaders::new(),
        }
    }
}

impl RequestHandler for ApiService {
    /// The transport-level outcome is always `200 OK`; whatever goes
    /// wrong at the action level travels inside the JSON body.
    fn handle(&self, request: &Request) -> Vec<u8> {
        let body = if request.body.is_empty() {
            // A bare probe, e.g. a browser opening the root URL
            format!("HostLink v.{}", API_VERSION).into_bytes()
        } else {
            match serde_json::from_slice::<Value>(&request.body) {
                Ok(envelope) => {
                    let reply = self.dispatcher.dispatch(&envelope);
                    serde_json::to_vec(&reply).unwrap_or_else(|_| b"null".to_vec())
                }
                // A malformed payload answers with a JSON null, still
                // at 200: protocol errors are data, not HTTP failures
                Err(_) => b"null".to_vec(),
            }
        };

        self.headers.build(&body)
    }
}
