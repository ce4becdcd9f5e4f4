// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use super::submit::{SubmitError, SubmitFuture, Submitter};
use invsync_core::OpId;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Create a scan payload for `code`.
pub fn scan_payload(code: &str, quantity: i64) -> Value {
    json!({
        "productCode": code,
        "quantity": quantity,
        "transactionType": "in",
    })
}

#[derive(Default)]
struct MockState {
    /// Product codes to fail, with the error to return.
    failing: HashMap<String, SubmitError>,
    /// Outcomes consumed in order before `failing` is consulted.
    scripted: VecDeque<Result<(), SubmitError>>,
    calls: Vec<(OpId, Value)>,
    delay: Option<Duration>,
}

/// Fake submission endpoint that records every call.
#[derive(Clone, Default)]
pub struct MockSubmitter {
    state: Arc<Mutex<MockState>>,
}

impl MockSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every submission whose product code is `code`.
    pub fn fail_code(&self, code: &str, error: SubmitError) {
        self.state
            .lock()
            .unwrap()
            .failing
            .insert(code.to_string(), error);
    }

    /// Fail the next submission with `error`, whatever its payload.
    pub fn fail_next(&self, error: SubmitError) {
        self.state.lock().unwrap().scripted.push_back(Err(error));
    }

    /// Make every submission take `delay` before answering.
    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().unwrap().delay = Some(delay);
    }

    pub fn calls(&self) -> Vec<(OpId, Value)> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Product codes submitted, in call order.
    pub fn codes(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter_map(|(_, payload)| payload["productCode"].as_str().map(String::from))
            .collect()
    }
}

impl Submitter for MockSubmitter {
    fn submit<'a>(&'a self, id: &'a OpId, payload: &'a Value) -> SubmitFuture<'a> {
        Box::pin(async move {
            let (delay, outcome) = {
                let mut state = self.state.lock().unwrap();
                state.calls.push((id.clone(), payload.clone()));
                let outcome = match state.scripted.pop_front() {
                    Some(outcome) => outcome,
                    None => match payload["productCode"]
                        .as_str()
                        .and_then(|code| state.failing.get(code))
                    {
                        Some(error) => Err(error.clone()),
                        None => Ok(()),
                    },
                };
                (state.delay, outcome)
            };
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            outcome.map(|()| json!({ "id": id.as_str() }))
        })
    }
}
