use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event, EventSource, MessageEvent, WebSocket, Window};

use waystone_shared::roulette::{parse_roll_event, RollEvent};

pub const ROULETTE_SOCKET_PATH: &str = "/ws/roulette/";
pub const ROULETTE_SSE_PATH: &str = "/sse/events/";
pub const ROLL_EVENT_NAME: &str = "roll_result";
const SNIPPET_LIMIT: usize = 200;

#[derive(Debug)]
pub enum PushEvent {
    Open,
    Close,
    Error,
    Roll(RollEvent),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushTransport {
    WebSocket,
    ServerSentEvents,
}

impl PushTransport {
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("ws") => PushTransport::WebSocket,
            _ => PushTransport::ServerSentEvents,
        }
    }
}

pub fn socket_scheme(protocol: &str) -> &'static str {
    if protocol == "https:" {
        "wss"
    } else {
        "ws"
    }
}

pub fn websocket_url(window: &Window, path: &str) -> Result<String, JsValue> {
    let location = window.location();
    let protocol = location.protocol()?;
    let host = location.host()?;
    Ok(format!("{}://{host}{path}", socket_scheme(&protocol)))
}

fn snippet(text: &str) -> String {
    if text.chars().count() <= SNIPPET_LIMIT {
        text.to_string()
    } else {
        let head: String = text.chars().take(SNIPPET_LIMIT).collect();
        format!("{head}...")
    }
}

fn decode_roll(text: &str) -> Option<RollEvent> {
    match parse_roll_event(text) {
        Ok(event) => Some(event),
        Err(error) => {
            log::error!("Push message JSON parse error: {error} payload={:?}", snippet(text));
            None
        }
    }
}

type Handler = Rc<RefCell<dyn FnMut(PushEvent)>>;

pub fn connect(
    window: &Window,
    transport: PushTransport,
    on_event: impl 'static + FnMut(PushEvent),
) -> Result<(), JsValue> {
    let on_event: Handler = Rc::new(RefCell::new(on_event));
    match transport {
        PushTransport::WebSocket => connect_socket(window, on_event),
        PushTransport::ServerSentEvents => connect_event_source(on_event),
    }
}

fn connect_socket(window: &Window, on_event: Handler) -> Result<(), JsValue> {
    let url = websocket_url(window, ROULETTE_SOCKET_PATH)?;
    log::info!("Connecting push socket {url}");
    let socket = WebSocket::new(&url)?;

    {
        let on_event = on_event.clone();
        let onopen = Closure::<dyn FnMut(Event)>::new(move |_| {
            on_event.borrow_mut()(PushEvent::Open);
        });
        socket.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        onopen.forget();
    }

    {
        let on_event = on_event.clone();
        let onclose = Closure::<dyn FnMut(CloseEvent)>::new(move |event: CloseEvent| {
            log::info!("Push socket closed (code {})", event.code());
            on_event.borrow_mut()(PushEvent::Close);
        });
        socket.set_onclose(Some(onclose.as_ref().unchecked_ref()));
        onclose.forget();
    }

    {
        let on_event = on_event.clone();
        let onerror = Closure::<dyn FnMut(Event)>::new(move |_| {
            on_event.borrow_mut()(PushEvent::Error);
        });
        socket.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();
    }

    {
        let on_event = on_event.clone();
        let onmessage = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            let Some(text) = event.data().as_string() else {
                log::error!("Push message data is not a string");
                return;
            };
            if let Some(roll) = decode_roll(&text) {
                on_event.borrow_mut()(PushEvent::Roll(roll));
            }
        });
        socket.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        onmessage.forget();
    }

    {
        let socket = socket.clone();
        let onbeforeunload = Closure::<dyn FnMut(Event)>::new(move |_| {
            let _ = socket.close();
        });
        window.add_event_listener_with_callback(
            "beforeunload",
            onbeforeunload.as_ref().unchecked_ref(),
        )?;
        onbeforeunload.forget();
    }

    Ok(())
}

fn connect_event_source(on_event: Handler) -> Result<(), JsValue> {
    log::info!("Opening event stream {ROULETTE_SSE_PATH}");
    let source = EventSource::new(ROULETTE_SSE_PATH)?;

    {
        let on_event = on_event.clone();
        let onopen = Closure::<dyn FnMut(Event)>::new(move |_| {
            on_event.borrow_mut()(PushEvent::Open);
        });
        source.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        onopen.forget();
    }

    {
        let on_event = on_event.clone();
        let onroll = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            let Some(text) = event.data().as_string() else {
                return;
            };
            if let Some(roll) = decode_roll(&text) {
                on_event.borrow_mut()(PushEvent::Roll(roll));
            }
        });
        source.add_event_listener_with_callback(ROLL_EVENT_NAME, onroll.as_ref().unchecked_ref())?;
        onroll.forget();
    }

    {
        let on_event = on_event.clone();
        let source_cb = source.clone();
        let onerror = Closure::<dyn FnMut(Event)>::new(move |_| {
            source_cb.close();
            on_event.borrow_mut()(PushEvent::Error);
        });
        source.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();
    }

    Ok(())
}
