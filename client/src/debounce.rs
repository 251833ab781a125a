use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

pub const RESIZE_DEBOUNCE_MS: i32 = 250;

pub fn on_resize_settled(window: &Window, action: impl 'static + Fn()) -> Result<(), JsValue> {
    let pending: Rc<Cell<Option<i32>>> = Rc::new(Cell::new(None));
    let fire = Closure::<dyn Fn()>::new(move || action());
    let window_cb = window.clone();
    let onresize = Closure::<dyn FnMut()>::new(move || {
        if let Some(handle) = pending.take() {
            window_cb.clear_timeout_with_handle(handle);
        }
        match window_cb.set_timeout_with_callback_and_timeout_and_arguments_0(
            fire.as_ref().unchecked_ref(),
            RESIZE_DEBOUNCE_MS,
        ) {
            Ok(handle) => pending.set(Some(handle)),
            Err(error) => log::error!("Could not schedule resize handler: {error:?}"),
        }
    });
    window.add_event_listener_with_callback("resize", onresize.as_ref().unchecked_ref())?;
    onresize.forget();
    Ok(())
}
