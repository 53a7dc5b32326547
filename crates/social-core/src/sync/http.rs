//! HTTP physics backend client.

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use social_wire::{
    AgentSnapshot, ResetRequest, ResetResponse, GLITCH_PATH, OBSERVER_PATH, RESET_PATH,
    STATE_PATH, STEP_PATH,
};

use super::{BackendError, PhysicsBackend};

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fire-and-check trigger; any 2xx counts, the body is ignored.
    fn post_trigger(&self, path: &'static str) -> Result<(), BackendError> {
        let response = self.client.post(self.url(path)).send()?;
        check_status(path, response)?;
        Ok(())
    }
}

fn check_status(path: &'static str, response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(BackendError::Status {
            path,
            status: status.as_u16(),
        })
    }
}

fn parse_response<T: DeserializeOwned>(
    path: &'static str,
    response: Response,
) -> Result<T, BackendError> {
    let body = check_status(path, response)?.text()?;
    Ok(serde_json::from_str(&body)?)
}

impl PhysicsBackend for HttpBackend {
    fn probe(&self) -> Result<(), BackendError> {
        let response = self.client.get(self.url(STATE_PATH)).send()?;
        check_status(STATE_PATH, response)?;
        Ok(())
    }

    fn reset(&self, request: &ResetRequest) -> Result<ResetResponse, BackendError> {
        let response = self.client.post(self.url(RESET_PATH)).json(request).send()?;
        parse_response(RESET_PATH, response)
    }

    fn step(&self, count: u32) -> Result<Vec<AgentSnapshot>, BackendError> {
        let url = format!("{}?count={}", self.url(STEP_PATH), count);
        let response = self.client.post(url).send()?;
        parse_response(STEP_PATH, response)
    }

    fn glitch(&self) -> Result<(), BackendError> {
        self.post_trigger(GLITCH_PATH)
    }

    fn observer(&self) -> Result<(), BackendError> {
        self.post_trigger(OBSERVER_PATH)
    }
}
