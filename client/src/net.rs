use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response, Window};

#[derive(Debug, Error)]
pub enum NetError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Decode(String),
}

impl NetError {
    pub fn status(&self) -> Option<u16> {
        match self {
            NetError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<JsValue> for NetError {
    fn from(value: JsValue) -> Self {
        NetError::Transport(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

#[derive(Clone)]
pub struct Api {
    window: Window,
    csrf_token: Option<String>,
}

impl Api {
    pub fn new(window: Window, csrf_token: Option<String>) -> Self {
        Self { window, csrf_token }
    }

    async fn send(&self, method: &str, url: &str, body: Option<String>) -> Result<String, NetError> {
        let headers = Headers::new()?;
        headers.set("Content-Type", "application/json")?;
        if let Some(token) = &self.csrf_token {
            headers.set("X-CSRFToken", token)?;
        }
        let init = RequestInit::new();
        init.set_method(method);
        init.set_headers(&headers);
        if let Some(body) = &body {
            init.set_body(&JsValue::from_str(body));
        }
        let request = Request::new_with_str_and_init(url, &init)?;
        let response: Response = JsFuture::from(self.window.fetch_with_request(&request))
            .await?
            .dyn_into()?;
        let text = JsFuture::from(response.text()?)
            .await?
            .as_string()
            .unwrap_or_default();
        log::debug!("{method} {url} -> {}", response.status());
        if !response.ok() {
            return Err(NetError::Http {
                status: response.status(),
                body: text,
            });
        }
        Ok(text)
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, NetError> {
        let text = self.send("GET", url, None).await?;
        serde_json::from_str(&text).map_err(|error| NetError::Decode(error.to_string()))
    }

    pub async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, NetError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload =
            serde_json::to_string(body).map_err(|error| NetError::Decode(error.to_string()))?;
        let text = self.send("POST", url, Some(payload)).await?;
        serde_json::from_str(&text).map_err(|error| NetError::Decode(error.to_string()))
    }

    pub async fn post_discard<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<(), NetError> {
        let payload =
            serde_json::to_string(body).map_err(|error| NetError::Decode(error.to_string()))?;
        self.send("POST", url, Some(payload)).await.map(|_| ())
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, url: &str) -> Result<T, NetError> {
        let text = self.send("POST", url, None).await?;
        serde_json::from_str(&text).map_err(|error| NetError::Decode(error.to_string()))
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}
