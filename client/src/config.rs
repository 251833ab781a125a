use js_sys::Reflect;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlDocument, Window};

pub const CSRF_COOKIE: &str = "csrftoken";
pub const CSRF_GLOBAL: &str = "CSRF_TOKEN";
pub const GUEST_NAME: &str = "Guest";

#[derive(Clone, Debug, Default)]
pub struct PageConfig {
    pub csrf_token: Option<String>,
    pub user_id: Option<u64>,
    pub username: String,
}

impl PageConfig {
    pub fn from_page(window: &Window, document: &Document) -> Self {
        let csrf_token = document_cookie(document)
            .and_then(|header| cookie_value(&header, CSRF_COOKIE).map(decode_component))
            .or_else(|| global_string(window, CSRF_GLOBAL));
        if csrf_token.is_none() {
            log::warn!("No CSRF token on the page; writes will be rejected");
        }
        let user_id = Reflect::get(window.as_ref(), &JsValue::from_str("currentUserId"))
            .ok()
            .and_then(|value| value.as_f64())
            .filter(|id| *id >= 0.0)
            .map(|id| id as u64);
        let username =
            global_string(window, "currentUsername").unwrap_or_else(|| GUEST_NAME.to_string());
        Self {
            csrf_token,
            user_id,
            username,
        }
    }
}

pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

fn decode_component(raw: &str) -> String {
    js_sys::decode_uri_component(raw)
        .map(String::from)
        .unwrap_or_else(|_| raw.to_string())
}

fn document_cookie(document: &Document) -> Option<String> {
    let document = document.dyn_ref::<HtmlDocument>()?;
    document.cookie().ok().filter(|cookie| !cookie.is_empty())
}

fn global_string(window: &Window, name: &str) -> Option<String> {
    Reflect::get(window.as_ref(), &JsValue::from_str(name))
        .ok()?
        .as_string()
        .filter(|value| !value.is_empty())
}

pub fn element_text(document: &Document, id: &str) -> Result<String, JsValue> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element: {id}")))?;
    Ok(element.text_content().unwrap_or_default().trim().to_string())
}

pub fn element_json<T: DeserializeOwned>(document: &Document, id: &str) -> Result<T, JsValue> {
    let text = element_text(document, id)?;
    serde_json::from_str(&text)
        .map_err(|error| JsValue::from_str(&format!("Invalid JSON in #{id}: {error}")))
}

#[cfg(test)]
mod tests {
    use super::cookie_value;

    #[test]
    fn finds_cookie_among_others() {
        let header = "sessionid=abc; csrftoken=Xy%3D12; theme=dark";
        assert_eq!(cookie_value(header, "csrftoken"), Some("Xy%3D12"));
        assert_eq!(cookie_value(header, "theme"), Some("dark"));
    }

    #[test]
    fn prefix_names_do_not_match() {
        let header = "xcsrftoken=1; csrftoken_old=2";
        assert_eq!(cookie_value(header, "csrftoken"), None);
        assert_eq!(cookie_value("", "csrftoken"), None);
    }
}
