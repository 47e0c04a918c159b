use anyhow::{Context, Result};
use moodsheet_config::LlmConfig;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::time::Duration;

/// Abstraction over LLM APIs. Enables testing with mocks.
pub trait LlmBackend {
    /// Send one system + user exchange and return the raw message content.
    fn complete(&self, system: &str, user: &str) -> Result<String>;
}

impl<B: LlmBackend + ?Sized> LlmBackend for &B {
    fn complete(&self, system: &str, user: &str) -> Result<String> {
        (**self).complete(system, user)
    }
}

impl<B: LlmBackend + ?Sized> LlmBackend for Box<B> {
    fn complete(&self, system: &str, user: &str) -> Result<String> {
        (**self).complete(system, user)
    }
}

/// Backend that speaks the OpenAI chat completions protocol.
///
/// The HTTP client is built once and reused, so consecutive rows share a
/// connection pool.
pub struct OpenAiCompatibleBackend {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl OpenAiCompatibleBackend {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            anyhow::bail!("LLM API key is not configured (llm.api_key)");
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .context("build LLM HTTP client")?;

        tracing::info!(
            "LLM client ready, base_url={}, model={}, timeout={}s",
            config.base_url,
            config.model,
            config.timeout
        );

        Ok(Self {
            client,
            endpoint: config.chat_completions_url(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_body(&self, system: &str, user: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ]
        })
    }
}

impl LlmBackend for OpenAiCompatibleBackend {
    fn complete(&self, system: &str, user: &str) -> Result<String> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.request_body(system, user))
            .send()
            .context("LLM API request failed")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_default();
            anyhow::bail!("LLM API returned {status}: {text}");
        }

        let json: serde_json::Value = resp.json().context("parse LLM response")?;
        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("no content in LLM response"))?
            .to_string();

        Ok(content)
    }
}

/// Mock backend for testing.
pub struct MockLlmBackend {
    pub response: String,
}

impl LlmBackend for MockLlmBackend {
    fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        Ok(self.response.clone())
    }
}

/// Mock backend that always fails.
pub struct FailingLlmBackend;

impl LlmBackend for FailingLlmBackend {
    fn complete(&self, _system: &str, _user: &str) -> Result<String> {
        anyhow::bail!("LLM backend failed (mock)")
    }
}

/// Mock backend that replays a fixed script, one entry per call.
///
/// `Err` entries become provider errors. Calls past the end of the script
/// fail. Every request is recorded.
#[derive(Default)]
pub struct ScriptedLlmBackend {
    script: RefCell<VecDeque<std::result::Result<String, String>>>,
    calls: Cell<usize>,
    requests: RefCell<Vec<(String, String)>>,
}

impl ScriptedLlmBackend {
    pub fn new<I, S>(script: I) -> Self
    where
        I: IntoIterator<Item = std::result::Result<S, S>>,
        S: Into<String>,
    {
        Self {
            script: RefCell::new(
                script
                    .into_iter()
                    .map(|r| r.map(Into::into).map_err(Into::into))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Script made only of successful responses.
    pub fn responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(responses.into_iter().map(Ok::<S, S>))
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// `(system, user)` pairs in call order.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.borrow().clone()
    }
}

impl LlmBackend for ScriptedLlmBackend {
    fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.calls.set(self.calls.get() + 1);
        self.requests
            .borrow_mut()
            .push((system.to_string(), user.to_string()));

        match self.script.borrow_mut().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => anyhow::bail!("{message}"),
            None => anyhow::bail!("scripted backend exhausted after {} calls", self.calls.get() - 1),
        }
    }
}
