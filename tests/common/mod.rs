#![allow(dead_code)]

use hyperres::{Request, Response, Result, Transport};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;

/// Transport that records requests and replays queued responses.
/// Once the queue is empty every request gets a 500 with a null body.
#[derive(Default)]
pub struct MockTransport {
    responses: RefCell<VecDeque<Response>>,
    requests: RefCell<Vec<Request>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: Value) -> Self {
        self.responses
            .borrow_mut()
            .push_back(Response::new(status, body));
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: &Request) -> Result<Response> {
        self.requests.borrow_mut().push(request.clone());
        Ok(self
            .responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Response::new(500, Value::Null)))
    }
}

/// Route library logs to the test output; honours RUST_LOG
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
