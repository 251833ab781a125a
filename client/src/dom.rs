use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlCanvasElement, HtmlElement, MouseEvent, Window};

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element: {id}")))?;
    element
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Invalid element type: {id}")))
}

pub fn query_element<T: JsCast>(document: &Document, selector: &str) -> Result<T, JsValue> {
    let element = document
        .query_selector(selector)?
        .ok_or_else(|| JsValue::from_str(&format!("Missing element: {selector}")))?;
    element
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Invalid element type: {selector}")))
}

pub fn set_display(element: &HtmlElement, visible: bool) {
    let value = if visible { "block" } else { "none" };
    let _ = element.style().set_property("display", value);
}

pub fn set_cursor(element: &HtmlElement, cursor: &str) {
    let _ = element.style().set_property("cursor", cursor);
}

pub fn set_hidden_section(element: &Element, hidden: bool) {
    let classes = element.class_list();
    let _ = if hidden {
        classes.add_1("hidden-section")
    } else {
        classes.remove_1("hidden-section")
    };
}

pub fn canvas_point(canvas: &HtmlCanvasElement, event: &MouseEvent) -> (f64, f64) {
    let rect = canvas.get_bounding_client_rect();
    (
        event.client_x() as f64 - rect.left(),
        event.client_y() as f64 - rect.top(),
    )
}

pub fn match_canvas_to(canvas: &HtmlCanvasElement, element: &HtmlElement) -> (f64, f64) {
    let width = element.client_width().max(0) as u32;
    let height = element.client_height().max(0) as u32;
    canvas.set_width(width);
    canvas.set_height(height);
    (width as f64, height as f64)
}

pub fn closest_with_attr(event: &Event, attr: &str) -> Option<(Element, String)> {
    let mut current = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok());
    while let Some(element) = current {
        if let Some(value) = element.get_attribute(attr) {
            return Some((element, value));
        }
        current = element.parent_element();
    }
    None
}

pub fn mark_selected(container: &Element, chosen: Option<&Element>) {
    if let Ok(buttons) = container.query_selector_all("button") {
        for index in 0..buttons.length() {
            if let Some(button) = buttons
                .item(index)
                .and_then(|node| node.dyn_into::<Element>().ok())
            {
                let _ = button.class_list().remove_1("selected");
            }
        }
    }
    if let Some(chosen) = chosen {
        let _ = chosen.class_list().add_1("selected");
    }
}

pub fn alert(window: &Window, message: &str) {
    if window.alert_with_message(message).is_err() {
        log::warn!("alert failed: {message}");
    }
}

pub fn redirect(window: &Window, href: &str) {
    if let Err(error) = window.location().set_href(href) {
        log::error!("Redirect to {href} failed: {error:?}");
    }
}
