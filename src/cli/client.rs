use anyhow::Context;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

/// Thin HTTP client for the /pokemons resource
pub struct PokedexClient {
    base_url: String,
    http: reqwest::Client,
}

impl PokedexClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let parsed = url::Url::parse(base_url).with_context(|| format!("invalid server URL: {}", base_url))?;
        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list(&self) -> anyhow::Result<Value> {
        self.call(Method::GET, &[], None).await
    }

    pub async fn get(&self, name: &str) -> anyhow::Result<Value> {
        self.call(Method::GET, &[("name", name)], None).await
    }

    pub async fn create(&self, pokemon: Value) -> anyhow::Result<Value> {
        self.call(Method::POST, &[], Some(pokemon)).await
    }

    pub async fn update(&self, pokemon: Value) -> anyhow::Result<Value> {
        self.call(Method::PUT, &[], Some(pokemon)).await
    }

    pub async fn delete(&self, name: &str) -> anyhow::Result<Value> {
        self.call(Method::DELETE, &[], Some(json!({ "name": name }))).await
    }

    async fn call(&self, method: Method, query: &[(&str, &str)], body: Option<Value>) -> anyhow::Result<Value> {
        let url = format!("{}/pokemons", self.base_url);
        let mut request = self.http.request(method, &url).query(query);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("failed to reach {}", url))?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if !status.is_success() {
            anyhow::bail!(error_message(status, &body));
        }
        Ok(body)
    }
}

/// Message from a `{status_code, message}` envelope, falling back to the status
fn error_message(status: StatusCode, body: &Value) -> String {
    match body.get("message").and_then(Value::as_str) {
        Some(message) => format!("{} ({})", message, status.as_u16()),
        None => format!("request failed with status {}", status),
    }
}
