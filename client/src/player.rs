use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Document, Event, HtmlCanvasElement, HtmlElement, HtmlImageElement,
    MouseEvent, Window,
};

use waystone_shared::{
    compute_grid, player_scene, BoardRecord, PathEditor, PathSegmentRecord, PathTool,
    PointerInput, Transition, ERASER_RADIUS,
};

use crate::config::{element_json, PageConfig};
use crate::debounce::on_resize_settled;
use crate::dom::{
    alert, canvas_point, closest_with_attr, get_element, mark_selected, match_canvas_to,
    query_element, set_cursor, set_display,
};
use crate::net::{Api, NetError};
use crate::render::{context_2d, replay};

pub const CANVAS_ID: &str = "play-grid-canvas";
const BOARD_DATA_ID: &str = "board-data-for-js-container";
const PRIMARY_BUTTON: i16 = 0;
const PRIMARY_BUTTON_MASK: u16 = 1;

fn eraser_cursor() -> String {
    let radius = ERASER_RADIUS;
    format!(
        "url(\"data:image/svg+xml;utf8,<svg xmlns='http://www.w3.org/2000/svg' width='24' height='24' viewBox='0 0 24 24'><circle cx='12' cy='12' r='{inner}' fill='none' stroke='black' stroke-width='1'/><circle cx='12' cy='12' r='{radius}' fill='rgba(255,0,0,0.3)'/></svg>\") {radius} {radius}, auto",
        inner = radius - 1.0,
    )
}

fn tool_cursor(tool: PathTool) -> String {
    match tool {
        PathTool::Pencil => "crosshair".to_string(),
        PathTool::Eraser => eraser_cursor(),
        PathTool::None => "default".to_string(),
    }
}

struct PlayerPage {
    board: BoardRecord,
    editor: PathEditor,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    image: HtmlImageElement,
    api: Api,
    paths_endpoint: String,
}

impl PlayerPage {
    fn redraw(&self) {
        let Some(grid) = self.editor.grid() else {
            return;
        };
        let scene = player_scene(
            grid,
            self.editor.paths(),
            self.editor.preview(),
            &self.board.waystones,
        );
        replay(&self.ctx, &scene);
    }

    fn sync_grid(&mut self) -> bool {
        let (width, height) = match_canvas_to(&self.canvas, &self.image);
        match compute_grid(width, height, self.board.grid_rows, self.board.grid_cols) {
            Ok(grid) => {
                self.editor.set_grid(grid);
                true
            }
            Err(error) => {
                log::error!("Cannot lay out board {}: {error}", self.board.id);
                false
            }
        }
    }

    fn save_task(&self) -> impl std::future::Future<Output = ()> {
        let api = self.api.clone();
        let endpoint = self.paths_endpoint.clone();
        let records = self.editor.records();
        async move {
            log::debug!("Saving {} path segments to {endpoint}", records.len());
            match api.post_discard(&endpoint, &records).await {
                Ok(()) => log::debug!("Paths saved"),
                Err(NetError::Http { status, body }) => {
                    log::error!("Path save rejected with HTTP {status}: {body}");
                    alert(api.window(), "Error saving paths on the server.");
                }
                Err(error) => {
                    log::error!("Path save failed: {error}");
                    alert(api.window(), "Network error while saving paths.");
                }
            }
        }
    }

    fn apply(&mut self, input: PointerInput) {
        match self.editor.handle_input(input) {
            Transition::Idle => {}
            Transition::Redraw => self.redraw(),
            Transition::Persist => {
                self.redraw();
                wasm_bindgen_futures::spawn_local(self.save_task());
            }
        }
    }
}

async fn load_paths(page: Rc<RefCell<PlayerPage>>) {
    let (api, endpoint) = {
        let page = page.borrow();
        (page.api.clone(), page.paths_endpoint.clone())
    };
    log::info!("Loading user paths from {endpoint}");
    let result = api.get_json::<Vec<PathSegmentRecord>>(&endpoint).await;
    let mut page = page.borrow_mut();
    match result {
        Ok(records) => page.editor.load_records(&records),
        Err(error) => {
            log::error!("Could not load user paths: {error}");
            page.editor.clear_paths();
        }
    }
    page.redraw();
}

fn read_board(document: &Document, placeholder: Option<&HtmlElement>) -> Result<BoardRecord, JsValue> {
    let report = |text: &str| {
        if let Some(placeholder) = placeholder {
            placeholder.set_text_content(Some(text));
        }
    };
    let board: BoardRecord = element_json(document, BOARD_DATA_ID).map_err(|error| {
        report("Error loading board data.");
        error
    })?;
    if board.image_url().is_none() {
        report("Incomplete board data.");
        return Err(JsValue::from_str("Board data has no map image"));
    }
    Ok(board)
}

pub fn start(window: &Window, document: &Document, config: &PageConfig) -> Result<(), JsValue> {
    let canvas: HtmlCanvasElement = get_element(document, CANVAS_ID)?;
    let ctx = context_2d(&canvas)?;
    let image: HtmlImageElement = get_element(document, "map-display-img")?;
    let placeholder: Option<HtmlElement> = get_element(document, "loading-placeholder").ok();
    let tool_palette: HtmlElement = query_element(document, ".tool-palette")?;

    let board = read_board(document, placeholder.as_ref())?;
    log::info!(
        "Board {} loaded: {}x{} with {} waystones",
        board.id,
        board.grid_rows,
        board.grid_cols,
        board.waystones.len()
    );
    let paths_endpoint = board.user_paths_endpoint();
    let image_url = board.image_url().unwrap_or_default().to_string();

    let page = Rc::new(RefCell::new(PlayerPage {
        board,
        editor: PathEditor::new(),
        canvas: canvas.clone(),
        ctx,
        image: image.clone(),
        api: Api::new(window.clone(), config.csrf_token.clone()),
        paths_endpoint,
    }));

    {
        let page = page.clone();
        let tool_palette_cb = tool_palette.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some((button, value)) = closest_with_attr(&event, "data-tool") else {
                return;
            };
            let tool = PathTool::from_data_attr(&value);
            mark_selected(&tool_palette_cb, Some(&button));
            let mut page = page.borrow_mut();
            set_cursor(&page.canvas, &tool_cursor(tool));
            log::debug!("Selected tool: {tool:?}");
            page.apply(PointerInput::SelectTool(tool));
        });
        tool_palette.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let page = page.clone();
        let placeholder = placeholder.clone();
        let onload = Closure::<dyn FnMut(Event)>::new(move |_| {
            if let Some(placeholder) = &placeholder {
                set_display(placeholder, false);
            }
            let ready = {
                let mut page = page.borrow_mut();
                set_display(&page.canvas, true);
                page.sync_grid()
            };
            if ready {
                wasm_bindgen_futures::spawn_local(load_paths(page.clone()));
            }
        });
        image.add_event_listener_with_callback("load", onload.as_ref().unchecked_ref())?;
        onload.forget();
    }

    {
        let placeholder = placeholder.clone();
        let onerror = Closure::<dyn FnMut(Event)>::new(move |_| {
            log::error!("Map image failed to load");
            if let Some(placeholder) = &placeholder {
                placeholder.set_text_content(Some("Could not load the map image."));
            }
        });
        image.add_event_listener_with_callback("error", onerror.as_ref().unchecked_ref())?;
        onerror.forget();
    }

    {
        let page = page.clone();
        let canvas_cb = canvas.clone();
        let ondown = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let (x, y) = canvas_point(&canvas_cb, &event);
            let primary = event.button() == PRIMARY_BUTTON;
            page.borrow_mut().apply(PointerInput::Down { x, y, primary });
        });
        canvas.add_event_listener_with_callback("mousedown", ondown.as_ref().unchecked_ref())?;
        ondown.forget();
    }

    {
        let page = page.clone();
        let canvas_cb = canvas.clone();
        let onmove = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let (x, y) = canvas_point(&canvas_cb, &event);
            let primary_held = event.buttons() & PRIMARY_BUTTON_MASK != 0;
            page.borrow_mut().apply(PointerInput::Move { x, y, primary_held });
        });
        canvas.add_event_listener_with_callback("mousemove", onmove.as_ref().unchecked_ref())?;
        onmove.forget();
    }

    {
        let page = page.clone();
        let canvas_cb = canvas.clone();
        let onup = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
            let (x, y) = canvas_point(&canvas_cb, &event);
            let primary = event.button() == PRIMARY_BUTTON;
            page.borrow_mut().apply(PointerInput::Up { x, y, primary });
        });
        canvas.add_event_listener_with_callback("mouseup", onup.as_ref().unchecked_ref())?;
        onup.forget();
    }

    {
        let page = page.clone();
        let onleave = Closure::<dyn FnMut(MouseEvent)>::new(move |_| {
            page.borrow_mut().apply(PointerInput::Leave);
        });
        canvas.add_event_listener_with_callback("mouseleave", onleave.as_ref().unchecked_ref())?;
        onleave.forget();
    }

    {
        let page = page.clone();
        on_resize_settled(window, move || {
            let mut page = page.borrow_mut();
            if page.image.client_width() <= 0 {
                return;
            }
            log::debug!("Window resized, redrawing board");
            if page.sync_grid() {
                page.redraw();
            }
        })?;
    }

    set_display(&image, true);
    image.set_src(&image_url);
    log::info!("Board player ready");
    Ok(())
}
