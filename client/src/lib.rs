mod config;
mod creator;
mod debounce;
mod dom;
mod logger;
mod net;
mod player;
mod render;
mod roulette;
mod ws;

use std::cell::Cell;
use std::rc::Rc;

use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Event, Window};

use crate::config::PageConfig;

type PageStart = fn(&Window, &Document, &PageConfig) -> Result<(), JsValue>;

const PAGES: [(&str, &str, PageStart); 3] = [
    ("board creator", creator::CANVAS_ID, creator::start),
    ("board player", player::CANVAS_ID, player::start),
    ("roulette", roulette::ROOT_ID, roulette::start),
];

fn document_ready_state(document: &Document) -> Option<String> {
    Reflect::get(document.as_ref(), &JsValue::from_str("readyState"))
        .ok()?
        .as_string()
}

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    logger::init(&window);
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;
    let started = Rc::new(Cell::new(false));

    if document_ready_state(&document).as_deref() != Some("loading") {
        started.set(true);
        start_pages();
        return Ok(());
    }

    let onready_started = started.clone();
    let onready = Closure::<dyn FnMut(Event)>::new(move |_| {
        if onready_started.replace(true) {
            return;
        }
        start_pages();
    });
    document.add_event_listener_with_callback("DOMContentLoaded", onready.as_ref().unchecked_ref())?;
    onready.forget();

    Ok(())
}

/// Starts every page feature whose root element is present. A feature that
/// fails to start is logged and left disabled.
fn start_pages() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        log::error!("Missing document");
        return;
    };
    if logger::debug_enabled(&window) {
        let href = window.location().href().unwrap_or_default();
        log::debug!("Debug logging enabled href={href}");
    }
    let config = PageConfig::from_page(&window, &document);

    let mut started = 0;
    for (name, marker_id, start) in PAGES {
        if document.get_element_by_id(marker_id).is_none() {
            continue;
        }
        match start(&window, &document, &config) {
            Ok(()) => started += 1,
            Err(error) => log::error!("The {name} could not start: {error:?}"),
        }
    }
    if started == 0 {
        log::debug!("No interactive board or roulette on this page");
    }
}
