use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Date, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlButtonElement, HtmlElement, Window};

use waystone_shared::roulette::{
    login_redirect, reaction_for, wheel_rotation, RecentOnes, RecentOnesResponse, RollEvent,
    RollReaction, SpinResponse, TOAST_LIFETIME_MS,
};

use crate::config::PageConfig;
use crate::dom::{alert, get_element, query_element, redirect};
use crate::net::Api;
use crate::ws::{connect, PushEvent, PushTransport};

pub const ROOT_ID: &str = "roulette-game";
const SPIN_URL: &str = "/spin/";
const FORBIDDEN: u16 = 403;
const RECENT_ONES_URL: &str = "/api/recent-ones/";
const EMPTY_RECENT: &str = "No Option 1 rolls yet.";
const WHEEL_TRANSITION: &str = "transform 4s cubic-bezier(0.25, 0.1, 0.25, 1)";

struct RoulettePage {
    window: Window,
    document: Document,
    user_id: Option<u64>,
    spin_button: HtmlButtonElement,
    wheel: HtmlElement,
    result_display: Element,
    recent_body: Element,
    toasts: Option<Element>,
    sticky: Option<Element>,
    recent: RecentOnes,
    animating: bool,
    pending_result: Option<String>,
    api: Api,
}

fn local_time(timestamp: &str) -> String {
    let date = Date::new(&JsValue::from_str(timestamp));
    if date.get_time().is_nan() {
        return timestamp.to_string();
    }
    date.to_locale_time_string("default").into()
}

impl RoulettePage {
    fn append_cell(&self, row: &Element, text: &str) -> Result<Element, JsValue> {
        let cell = self.document.create_element("td")?;
        cell.set_text_content(Some(text));
        row.append_child(&cell)?;
        Ok(cell)
    }

    fn render_recent(&self) -> Result<(), JsValue> {
        self.recent_body.set_inner_html("");
        if self.recent.is_empty() {
            let row = self.document.create_element("tr")?;
            let cell = self.append_cell(&row, EMPTY_RECENT)?;
            cell.set_attribute("colspan", "2")?;
            self.recent_body.append_child(&row)?;
            return Ok(());
        }
        for entry in self.recent.iter() {
            let row = self.document.create_element("tr")?;
            self.append_cell(&row, &entry.username)?;
            self.append_cell(&row, &local_time(&entry.timestamp))?;
            self.recent_body.append_child(&row)?;
        }
        Ok(())
    }

    fn set_result(&self, text: &str) {
        self.result_display.set_text_content(Some(text));
    }

    fn finish_spin(&mut self) {
        self.animating = false;
        self.spin_button.set_disabled(false);
    }

    fn animate(&mut self, rolled_number: u8, initiator: &str) {
        if self.animating {
            log::info!("Wheel is already animating, skipping new animation");
            return;
        }
        let Some(rotation) = wheel_rotation(rolled_number) else {
            log::error!("Rolled number {rolled_number} is not on the wheel");
            self.set_result("An error occurred.");
            self.finish_spin();
            return;
        };
        self.animating = true;
        self.spin_button.set_disabled(true);
        self.pending_result = Some(format!("{initiator} rolled a {rolled_number}!"));

        let style = self.wheel.style();
        let _ = style.set_property("transition", "none");
        let _ = style.set_property("transform", "rotate(0deg)");
        // Forces a reflow so the reset is applied before the new transition.
        let _ = self.wheel.offset_height();
        let _ = style.set_property("transition", WHEEL_TRANSITION);
        let _ = style.set_property("transform", &format!("rotate(-{rotation}deg)"));
    }

    fn on_transition_end(&mut self, event: &Event) {
        let property = Reflect::get(event.as_ref(), &JsValue::from_str("propertyName"))
            .ok()
            .and_then(|value| value.as_string());
        if property.as_deref() != Some("transform") || !self.animating {
            return;
        }
        if let Some(text) = self.pending_result.take() {
            self.set_result(&text);
        }
        self.finish_spin();
    }

    fn show_toast(&self, message: &str) -> Result<(), JsValue> {
        let Some(container) = &self.toasts else {
            log::warn!("No notification container for: {message}");
            return Ok(());
        };
        let toast = self.document.create_element("div")?;
        toast.class_list().add_1("notification")?;
        toast.set_text_content(Some(message));
        container.append_child(&toast)?;
        let remove = Closure::once_into_js(move || toast.remove());
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                remove.unchecked_ref(),
                TOAST_LIFETIME_MS,
            )?;
        Ok(())
    }

    fn show_sticky(&self, message: &str) -> Result<(), JsValue> {
        let Some(container) = &self.sticky else {
            log::warn!("No notification container for: {message}");
            return Ok(());
        };
        let note = self.document.create_element("div")?;
        note.class_list().add_1("hand-close-notification")?;
        let close = self.document.create_element("button")?;
        close.class_list().add_1("close-btn")?;
        close.set_text_content(Some("\u{00d7}"));
        let text = self.document.create_element("p")?;
        text.set_text_content(Some(message));
        note.append_child(&close)?;
        note.append_child(&text)?;

        let note_cb = note.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| note_cb.remove());
        close.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();

        container.append_child(&note)?;
        Ok(())
    }

    fn on_roll(&mut self, event: RollEvent) -> Result<(), JsValue> {
        if event.is_from(self.user_id) {
            log::info!(
                "Own spin via push channel: {} rolled {}",
                event.username,
                event.rolled_number
            );
        } else {
            log::info!(
                "Remote spin: {} rolled {}",
                event.username,
                event.rolled_number
            );
        }
        match reaction_for(&event) {
            Some(RollReaction::RecordOne(entry)) => {
                self.recent.push(entry);
                self.render_recent()
            }
            Some(RollReaction::Sticky(message)) => self.show_sticky(&message),
            Some(RollReaction::Toast(message)) => self.show_toast(&message),
            None => Ok(()),
        }
    }
}

async fn spin(page: Rc<RefCell<RoulettePage>>) {
    let api = page.borrow().api.clone();
    let result = api.post_empty::<SpinResponse>(SPIN_URL).await;
    let mut page = page.borrow_mut();
    match result {
        Ok(SpinResponse {
            success: true,
            rolled_number: Some(number),
            ..
        }) => page.animate(number, "You"),
        Ok(response) => {
            log::error!("Spin reported failure: {:?}", response.message);
            page.set_result("Spin failed.");
            page.finish_spin();
        }
        Err(error) if error.status() == Some(FORBIDDEN) => {
            log::warn!("Spin refused: {error}");
            alert(&page.window, "You must be logged in to spin the wheel.");
            let pathname = page.window.location().pathname().unwrap_or_default();
            redirect(&page.window, &login_redirect(&pathname));
            page.finish_spin();
        }
        Err(error) => {
            log::error!("Error during spin: {error}");
            page.set_result("An error occurred.");
            page.finish_spin();
        }
    }
}

async fn load_recent(page: Rc<RefCell<RoulettePage>>) {
    let api = page.borrow().api.clone();
    match api.get_json::<RecentOnesResponse>(RECENT_ONES_URL).await {
        Ok(response) => {
            let mut page = page.borrow_mut();
            page.recent.replace_all(response.recent_ones);
            if let Err(error) = page.render_recent() {
                log::error!("Could not render recent ones: {error:?}");
            }
        }
        Err(error) => log::error!("Error fetching recent ones: {error}"),
    }
}

pub fn start(window: &Window, document: &Document, config: &PageConfig) -> Result<(), JsValue> {
    let root: Element = get_element(document, ROOT_ID)?;
    let spin_button: HtmlButtonElement = get_element(document, "spin-button")?;
    let wheel: HtmlElement = get_element(document, "roulette-wheel")?;
    let result_display: Element = get_element(document, "result-display")?;
    let recent_body: Element = query_element(document, "#recent-ones-table tbody")?;
    let toasts: Option<Element> = get_element(document, "notification-container").ok();
    let sticky: Option<Element> = get_element(document, "left-notification-container").ok();
    let transport = PushTransport::from_attr(root.get_attribute("data-push").as_deref());

    let page = Rc::new(RefCell::new(RoulettePage {
        window: window.clone(),
        document: document.clone(),
        user_id: config.user_id,
        spin_button: spin_button.clone(),
        wheel: wheel.clone(),
        result_display,
        recent_body,
        toasts,
        sticky,
        recent: RecentOnes::new(),
        animating: false,
        pending_result: None,
        api: Api::new(window.clone(), config.csrf_token.clone()),
    }));

    {
        let page = page.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            {
                let page = page.borrow();
                if page.animating {
                    log::info!("Already spinning, please wait");
                    return;
                }
                page.set_result("Requesting spin...");
                page.spin_button.set_disabled(true);
            }
            wasm_bindgen_futures::spawn_local(spin(page.clone()));
        });
        spin_button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let page = page.clone();
        let onend = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            page.borrow_mut().on_transition_end(&event);
        });
        wheel.add_event_listener_with_callback("transitionend", onend.as_ref().unchecked_ref())?;
        onend.forget();
    }

    {
        let page = page.clone();
        connect(window, transport, move |event| match event {
            PushEvent::Open => log::info!("Push channel open"),
            PushEvent::Close => log::info!("Push channel closed"),
            PushEvent::Error => log::error!("Push channel error"),
            PushEvent::Roll(roll) => {
                if let Err(error) = page.borrow_mut().on_roll(roll) {
                    log::error!("Could not show roll: {error:?}");
                }
            }
        })?;
    }

    page.borrow().render_recent()?;
    wasm_bindgen_futures::spawn_local(load_recent(page));
    log::info!("Roulette ready for {}", config.username);
    Ok(())
}
