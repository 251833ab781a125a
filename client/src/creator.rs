use std::cell::RefCell;
use std::rc::Rc;

use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Document, Element, Event, HtmlButtonElement, HtmlCanvasElement,
    HtmlElement, HtmlImageElement, HtmlInputElement, HtmlSelectElement, MouseEvent, Window,
};

use waystone_shared::palette::palette_from_pairs;
use waystone_shared::{
    creator_scene, format_field_errors, Brush, CreatorError, CreatorSession, DEFAULT_PALETTE,
};

use crate::config::{element_json, element_text, PageConfig};
use crate::debounce::on_resize_settled;
use crate::dom::{
    alert, canvas_point, closest_with_attr, get_element, mark_selected, match_canvas_to,
    query_element, redirect, set_display, set_hidden_section,
};
use crate::net::{Api, NetError};
use crate::render::{context_2d, replay};

pub const CANVAS_ID: &str = "grid-overlay-canvas";
const SAVE_LABEL: &str = "Save Board";
const SAVING_LABEL: &str = "Saving...";

#[derive(Deserialize)]
struct SavedBoard {
    #[serde(default)]
    name: String,
}

struct CreatorPage {
    window: Window,
    document: Document,
    session: CreatorSession,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    image: HtmlImageElement,
    map_select: HtmlSelectElement,
    rows_input: HtmlInputElement,
    cols_input: HtmlInputElement,
    palette_el: Element,
    validation_el: HtmlElement,
    confirm_button: HtmlButtonElement,
    save_button: HtmlButtonElement,
    step_one: HtmlElement,
    step_two: HtmlElement,
    api: Api,
    boards_endpoint: String,
    saving: bool,
}

fn parse_dimension(input: &HtmlInputElement) -> Option<u32> {
    input.value().trim().parse().ok()
}

impl CreatorPage {
    fn redraw(&self) {
        match self.session.grid() {
            Some(grid) => {
                set_display(&self.canvas, true);
                replay(&self.ctx, &creator_scene(grid, self.session.waystones()));
            }
            None => {
                self.ctx.clear_rect(
                    0.0,
                    0.0,
                    self.canvas.width() as f64,
                    self.canvas.height() as f64,
                );
                set_display(&self.canvas, false);
            }
        }
    }

    fn sync_image_size(&mut self) {
        let width = self.image.client_width();
        let height = self.image.client_height();
        if width <= 0 || height <= 0 {
            log::debug!("Map image has no rendered size yet");
            return;
        }
        match_canvas_to(&self.canvas, &self.image);
        self.session.set_image_size(width as f64, height as f64);
    }

    fn refresh_validation(&self) {
        if !self.session.is_confirmed() {
            set_display(&self.validation_el, false);
            self.save_button.set_disabled(true);
            return;
        }
        let result = self.session.validation();
        if result.valid {
            self.validation_el.set_text_content(Some("Board is VALID."));
            self.validation_el.set_class_name("alert alert-success");
        } else {
            self.validation_el.set_text_content(Some("Board is INVALID:"));
            for message in &result.messages {
                if let Ok(line) = self.document.create_element("div") {
                    line.set_text_content(Some(message));
                    let _ = self.validation_el.append_child(&line);
                }
            }
            self.validation_el.set_class_name("alert alert-danger");
        }
        set_display(&self.validation_el, true);
        self.save_button.set_disabled(!result.valid || self.saving);
    }

    fn set_layout_locked(&self, locked: bool) {
        self.map_select.set_disabled(locked);
        self.rows_input.set_disabled(locked);
        self.cols_input.set_disabled(locked);
        set_hidden_section(&self.confirm_button, locked);
        set_hidden_section(&self.step_two, !locked);
        let opacity = if locked { "0.5" } else { "1" };
        for selector in [".form-group", ".form-row"] {
            if let Ok(Some(element)) = self.step_one.query_selector(selector) {
                if let Ok(element) = element.dyn_into::<HtmlElement>() {
                    let _ = element.style().set_property("opacity", opacity);
                }
            }
        }
        let pointer = if locked { "auto" } else { "none" };
        let _ = self.canvas.style().set_property("pointer-events", pointer);
        if !locked {
            mark_selected(&self.palette_el, None);
        }
    }

    fn select_map(&mut self) {
        let value = self.map_select.value();
        let map_id = value.trim().parse::<u64>().ok();
        let image_url = self
            .map_select
            .selected_options()
            .item(0)
            .and_then(|option| option.get_attribute("data-image-url"))
            .filter(|url| !url.is_empty());

        if self.session.is_confirmed() {
            self.session.reset();
            self.set_layout_locked(false);
        }
        let (map_id, image_url) = match (map_id, image_url) {
            (Some(map_id), Some(url)) => (Some(map_id), Some(url)),
            (Some(map_id), None) => {
                log::error!("Map {map_id} has no image URL");
                (None, None)
            }
            _ => (None, None),
        };
        if let Err(error) = self.session.select_map(map_id) {
            log::warn!("Map change ignored: {error}");
            return;
        }
        match image_url {
            Some(url) => {
                log::info!("Selected map {map_id:?} ({url})");
                set_display(&self.image, true);
                self.image.set_src(&url);
                // A cached image may already be complete.
                if self.image.complete() && self.image.natural_width() > 0 {
                    self.sync_image_size();
                }
            }
            None => {
                set_display(&self.image, false);
                self.image.remove_attribute("src").ok();
            }
        }
        self.refresh_validation();
        self.redraw();
    }

    fn change_dimensions(&mut self) {
        let rows = parse_dimension(&self.rows_input);
        let cols = parse_dimension(&self.cols_input);
        if let Err(error) = self.session.set_dimensions(rows, cols) {
            log::debug!("Grid preview hidden: {error}");
        }
        self.redraw();
    }

    fn confirm(&mut self) {
        self.sync_image_size();
        match self.session.confirm() {
            Ok(()) => {
                self.set_layout_locked(true);
                self.refresh_validation();
                self.redraw();
            }
            Err(error) => alert(&self.window, &error.to_string()),
        }
    }

    fn reset(&mut self) {
        self.session.reset();
        self.set_layout_locked(false);
        self.refresh_validation();
        self.redraw();
    }

    fn select_brush(&mut self, button: &Element, value: &str) {
        match Brush::from_data_attr(value) {
            Some(brush) => {
                self.session.select_brush(brush);
                mark_selected(&self.palette_el, Some(button));
                log::debug!("Brush selected: {brush:?}");
            }
            None => log::warn!("Unknown palette entry {value:?}"),
        }
    }

    fn click(&mut self, x: f64, y: f64) {
        match self.session.click(x, y) {
            Ok(outcome) => {
                log::debug!("Canvas click at ({x}, {y}): {outcome:?}");
                if !outcome.mutated() {
                    return;
                }
            }
            Err(CreatorError::NoToolSelected) => {
                alert(&self.window, &CreatorError::NoToolSelected.to_string());
                return;
            }
            Err(error) => {
                log::debug!("Canvas click ignored: {error}");
                return;
            }
        }
        self.refresh_validation();
        self.redraw();
    }

    fn set_saving(&mut self, saving: bool) {
        self.saving = saving;
        self.save_button
            .set_text_content(Some(if saving { SAVING_LABEL } else { SAVE_LABEL }));
        self.refresh_validation();
    }
}

async fn save_board(page: Rc<RefCell<CreatorPage>>) {
    let (api, endpoint, request) = {
        let mut page_ref = page.borrow_mut();
        let request = match page_ref.session.submission() {
            Ok(request) => request,
            Err(validation) => {
                log::info!("Save refused: {:?}", validation.messages);
                alert(
                    &page_ref.window,
                    "Cannot save an invalid or unconfirmed board.",
                );
                return;
            }
        };
        page_ref.set_saving(true);
        (page_ref.api.clone(), page_ref.boards_endpoint.clone(), request)
    };

    let result = api.post_json::<_, SavedBoard>(&endpoint, &request).await;
    let mut page_ref = page.borrow_mut();
    match result {
        Ok(saved) => {
            log::info!("Board saved: {}", saved.name);
            alert(&page_ref.window, &format!("Board \"{}\" saved.", saved.name));
            redirect(&page_ref.window, "/");
        }
        Err(NetError::Http { status, body }) => {
            log::warn!("Board save rejected with HTTP {status}");
            let details = serde_json::from_str::<serde_json::Value>(&body)
                .map(|value| format_field_errors(&value))
                .unwrap_or(body);
            alert(
                &page_ref.window,
                &format!("Could not save the board:\n{details}"),
            );
            page_ref.set_saving(false);
        }
        Err(error) => {
            log::error!("Board save failed: {error}");
            alert(&page_ref.window, "Unexpected error. Please try again.");
            page_ref.set_saving(false);
        }
    }
}

fn load_palette(document: &Document) -> Vec<waystone_shared::WaystoneColor> {
    match element_json::<Vec<(String, String)>>(document, "waystone-colors-data") {
        Ok(pairs) => {
            let palette = palette_from_pairs(&pairs);
            if palette.is_empty() {
                log::warn!("Empty waystone palette on the page, using the default colors");
                DEFAULT_PALETTE.to_vec()
            } else {
                palette
            }
        }
        Err(error) => {
            log::error!("{error:?}");
            DEFAULT_PALETTE.to_vec()
        }
    }
}

pub fn start(window: &Window, document: &Document, config: &PageConfig) -> Result<(), JsValue> {
    let canvas: HtmlCanvasElement = get_element(document, CANVAS_ID)?;
    let ctx = context_2d(&canvas)?;
    let boards_endpoint = element_text(document, "api-boards-endpoint")?;
    let initial_map = element_text(document, "initial-map-id-data").unwrap_or_default();

    let name_input: HtmlInputElement = get_element(document, "boardName")?;
    let map_select: HtmlSelectElement = get_element(document, "mapSelect")?;
    let rows_input: HtmlInputElement = get_element(document, "gridRows")?;
    let cols_input: HtmlInputElement = get_element(document, "gridCols")?;
    let image: HtmlImageElement = get_element(document, "map-background-img")?;
    let palette_el: HtmlElement = query_element(document, ".color-palette")?;
    let validation_el: HtmlElement = get_element(document, "validation-message")?;
    let confirm_button: HtmlButtonElement = get_element(document, "confirmGridButton")?;
    let save_button: HtmlButtonElement = get_element(document, "saveBoardButton")?;
    let reset_button: HtmlButtonElement = get_element(document, "resetToStep1Button")?;
    let step_one: HtmlElement = get_element(document, "step-1-map-grid-selection")?;
    let step_two: HtmlElement = get_element(document, "step-2-waystone-placement")?;

    let mut session = CreatorSession::new(load_palette(document));
    session.set_board_name(name_input.value());

    let page = Rc::new(RefCell::new(CreatorPage {
        window: window.clone(),
        document: document.clone(),
        session,
        canvas: canvas.clone(),
        ctx,
        image: image.clone(),
        map_select: map_select.clone(),
        rows_input: rows_input.clone(),
        cols_input: cols_input.clone(),
        palette_el: palette_el.clone().into(),
        validation_el,
        confirm_button: confirm_button.clone(),
        save_button: save_button.clone(),
        step_one,
        step_two,
        api: Api::new(window.clone(), config.csrf_token.clone()),
        boards_endpoint,
        saving: false,
    }));

    {
        let page = page.clone();
        let onchange = Closure::<dyn FnMut(Event)>::new(move |_| {
            page.borrow_mut().select_map();
        });
        map_select.add_event_listener_with_callback("change", onchange.as_ref().unchecked_ref())?;
        onchange.forget();
    }

    {
        let page = page.clone();
        let oninput = Closure::<dyn FnMut(Event)>::new(move |_| {
            page.borrow_mut().change_dimensions();
        });
        rows_input.add_event_listener_with_callback("input", oninput.as_ref().unchecked_ref())?;
        cols_input.add_event_listener_with_callback("input", oninput.as_ref().unchecked_ref())?;
        oninput.forget();
    }

    {
        let page = page.clone();
        let name_cb = name_input.clone();
        let oninput = Closure::<dyn FnMut(Event)>::new(move |_| {
            let mut page = page.borrow_mut();
            page.session.set_board_name(name_cb.value());
            page.refresh_validation();
        });
        name_input.add_event_listener_with_callback("input", oninput.as_ref().unchecked_ref())?;
        oninput.forget();
    }

    {
        let page = page.clone();
        let onload = Closure::<dyn FnMut(Event)>::new(move |_| {
            let mut page = page.borrow_mut();
            log::info!(
                "Map image loaded {}x{}",
                page.image.natural_width(),
                page.image.natural_height()
            );
            page.sync_image_size();
            page.redraw();
        });
        image.add_event_listener_with_callback("load", onload.as_ref().unchecked_ref())?;
        onload.forget();
    }

    {
        let page = page.clone();
        let onerror = Closure::<dyn FnMut(Event)>::new(move |_| {
            let mut page = page.borrow_mut();
            if page.image.get_attribute("src").is_none() {
                return;
            }
            log::error!("Map image failed to load");
            page.session.clear_image();
            set_display(&page.image, false);
            page.redraw();
        });
        image.add_event_listener_with_callback("error", onerror.as_ref().unchecked_ref())?;
        onerror.forget();
    }

    {
        let page = page.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            page.borrow_mut().confirm();
        });
        confirm_button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let page = page.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some((button, value)) = closest_with_attr(&event, "data-color") else {
                return;
            };
            page.borrow_mut().select_brush(&button, &value);
        });
        palette_el.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let page = page.clone();
        let canvas_cb = canvas.clone();
        let onclick = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let (x, y) = canvas_point(&canvas_cb, &event);
            page.borrow_mut().click(x, y);
        });
        canvas.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let page = page.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            page.borrow_mut().reset();
        });
        reset_button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let page = page.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            if page.borrow().saving {
                return;
            }
            wasm_bindgen_futures::spawn_local(save_board(page.clone()));
        });
        save_button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let page = page.clone();
        on_resize_settled(window, move || {
            let mut page = page.borrow_mut();
            if page.session.map_id().is_none() || page.image.client_width() <= 0 {
                return;
            }
            log::debug!("Window resized, recomputing grid");
            page.sync_image_size();
            page.redraw();
        })?;
    }

    {
        let mut page = page.borrow_mut();
        if !initial_map.is_empty() {
            page.map_select.set_value(&initial_map);
        }
        page.set_layout_locked(false);
        page.change_dimensions();
        page.select_map();
        page.refresh_validation();
    }

    log::info!("Board creator ready");
    Ok(())
}
