//! Page lifecycle: find the container, attach a canvas, run the frame loop,
//! and fill the canopy once the fruit list arrives.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use crate::config::SceneConfig;
use crate::data::fetch_fruit_count;
use crate::FruitTreeScene;

type SharedScene = Rc<RefCell<FruitTreeScene>>;

/// Mount the scene into the configured container element
///
/// A page without the container is left untouched. The frame loop starts
/// immediately with a bare tree; the returned promise resolves once the
/// fruit fetch settles and the ornaments are placed.
#[wasm_bindgen]
pub async fn mount(config_yaml: Option<String>) -> Result<(), JsValue> {
    let config = match config_yaml {
        Some(yaml) => SceneConfig::from_yaml(&yaml)
            .map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => SceneConfig::default(),
    };

    let window = web_sys::window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;

    let Some(container) = document.get_element_by_id(&config.container_id) else {
        log::debug!("No #{} on this page, nothing to mount", config.container_id);
        return Ok(());
    };

    let canvas = document
        .create_element("canvas")?
        .dyn_into::<HtmlCanvasElement>()?;
    container.append_child(&canvas)?;

    let fallback_height = config.fallback_height;
    let endpoint = config.fruit_endpoint.clone();
    let (width, height) = container_size(&container, fallback_height);

    let mut scene = FruitTreeScene::build(canvas.clone(), config)?;
    scene.resize(width, height)?;
    let scene: SharedScene = Rc::new(RefCell::new(scene));
    log::info!("Mounted tree scene at {}x{}", width, height);

    start_frame_loop(&window, scene.clone())?;
    listen_for_resize(&window, container, fallback_height, scene.clone())?;
    attach_pointer_controls(&window, &canvas, scene.clone())?;

    // Frames keep rendering the bare tree while this is pending
    let count = fetch_fruit_count(&endpoint).await;
    let result = scene.borrow_mut().place_ornaments(count);
    result
}

/// Container size in CSS pixels; a collapsed container uses `fallback_height`
fn container_size(container: &Element, fallback_height: u32) -> (i32, i32) {
    resolve_size(container.client_width(), container.client_height(), fallback_height)
}

fn resolve_size(width: i32, height: i32, fallback_height: u32) -> (i32, i32) {
    let height = if height > 0 { height } else { fallback_height as i32 };
    (width.max(1), height.max(1))
}

fn request_frame(window: &Window, callback: &Closure<dyn FnMut(f64)>) -> Result<i32, JsValue> {
    window.request_animation_frame(callback.as_ref().unchecked_ref())
}

/// Drive `render` from `requestAnimationFrame` for the life of the page
fn start_frame_loop(window: &Window, scene: SharedScene) -> Result<(), JsValue> {
    let frame: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let next = frame.clone();
    let mut last_timestamp: Option<f64> = None;

    *frame.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
        let dt = frame_delta(last_timestamp, timestamp);
        last_timestamp = Some(timestamp);

        scene.borrow_mut().render(dt);

        if let (Some(window), Some(callback)) = (web_sys::window(), next.borrow().as_ref()) {
            if let Err(e) = request_frame(&window, callback) {
                log::error!("Frame loop stopped: {:?}", e);
            }
        }
    }) as Box<dyn FnMut(f64)>));

    if let Some(callback) = frame.borrow().as_ref() {
        request_frame(window, callback)?;
    }
    Ok(())
}

/// Seconds between two frame timestamps in milliseconds
fn frame_delta(previous: Option<f64>, now: f64) -> f32 {
    match previous {
        Some(prev) if now > prev => ((now - prev) / 1000.0) as f32,
        _ => 0.0,
    }
}

fn listen_for_resize(
    window: &Window,
    container: Element,
    fallback_height: u32,
    scene: SharedScene,
) -> Result<(), JsValue> {
    let on_resize = Closure::wrap(Box::new(move || {
        let (width, height) = container_size(&container, fallback_height);
        if let Err(e) = scene.borrow_mut().resize(width, height) {
            log::warn!("Resize failed: {:?}", e);
        }
    }) as Box<dyn FnMut()>);

    window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
    on_resize.forget();
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum DragMode {
    Orbit,
    Pan,
}

/// Left drag orbits, right or shift drag pans
fn drag_mode(button: i16, shift: bool) -> Option<DragMode> {
    match (button, shift) {
        (0, false) => Some(DragMode::Orbit),
        (0, true) | (2, _) => Some(DragMode::Pan),
        _ => None,
    }
}

/// Wheel delta in pixels to zoom steps
fn wheel_steps(delta_y: f64, delta_mode: u32) -> f32 {
    // DOM_DELTA_LINE and DOM_DELTA_PAGE report far smaller numbers
    let pixels = match delta_mode {
        1 => delta_y * 16.0,
        2 => delta_y * 400.0,
        _ => delta_y,
    };
    (pixels / 100.0).clamp(-5.0, 5.0) as f32
}

fn attach_pointer_controls(
    window: &Window,
    canvas: &HtmlCanvasElement,
    scene: SharedScene,
) -> Result<(), JsValue> {
    let drag: Rc<Cell<Option<(DragMode, i32, i32)>>> = Rc::new(Cell::new(None));

    let on_down = {
        let drag = drag.clone();
        Closure::wrap(Box::new(move |event: MouseEvent| {
            if let Some(mode) = drag_mode(event.button(), event.shift_key()) {
                event.prevent_default();
                drag.set(Some((mode, event.client_x(), event.client_y())));
            }
        }) as Box<dyn FnMut(MouseEvent)>)
    };

    // Move and release go on the window so drags survive leaving the canvas
    let on_move = {
        let drag = drag.clone();
        let scene = scene.clone();
        Closure::wrap(Box::new(move |event: MouseEvent| {
            let Some((mode, x, y)) = drag.get() else { return };
            let (dx, dy) = ((event.client_x() - x) as f32, (event.client_y() - y) as f32);
            drag.set(Some((mode, event.client_x(), event.client_y())));

            let mut scene = scene.borrow_mut();
            match mode {
                DragMode::Orbit => scene.orbit(dx, dy),
                DragMode::Pan => scene.pan(dx, dy),
            }
        }) as Box<dyn FnMut(MouseEvent)>)
    };

    let on_up = Closure::wrap(Box::new(move |_event: MouseEvent| {
        drag.set(None);
    }) as Box<dyn FnMut(MouseEvent)>);

    let on_wheel = Closure::wrap(Box::new(move |event: WheelEvent| {
        event.prevent_default();
        scene.borrow_mut().zoom(wheel_steps(event.delta_y(), event.delta_mode()));
    }) as Box<dyn FnMut(WheelEvent)>);

    let on_context_menu = Closure::wrap(Box::new(move |event: MouseEvent| {
        event.prevent_default();
    }) as Box<dyn FnMut(MouseEvent)>);

    canvas.add_event_listener_with_callback("mousedown", on_down.as_ref().unchecked_ref())?;
    window.add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref())?;
    window.add_event_listener_with_callback("mouseup", on_up.as_ref().unchecked_ref())?;
    canvas.add_event_listener_with_callback("wheel", on_wheel.as_ref().unchecked_ref())?;
    canvas.add_event_listener_with_callback("contextmenu", on_context_menu.as_ref().unchecked_ref())?;

    on_down.forget();
    on_move.forget();
    on_up.forget();
    on_wheel.forget();
    on_context_menu.forget();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_size_uses_fallback_for_collapsed_container() {
        assert_eq!(resolve_size(960, 0, 500), (960, 500));
        assert_eq!(resolve_size(960, 640, 500), (960, 640));
        assert_eq!(resolve_size(0, 0, 500), (1, 500));
    }

    #[test]
    fn test_frame_delta() {
        assert_eq!(frame_delta(None, 1234.0), 0.0);
        assert!((frame_delta(Some(1000.0), 1016.0) - 0.016).abs() < 1e-6);
        // Clock going backwards never yields a negative step
        assert_eq!(frame_delta(Some(2000.0), 1000.0), 0.0);
    }

    #[test]
    fn test_drag_mode() {
        assert_eq!(drag_mode(0, false), Some(DragMode::Orbit));
        assert_eq!(drag_mode(0, true), Some(DragMode::Pan));
        assert_eq!(drag_mode(2, false), Some(DragMode::Pan));
        assert_eq!(drag_mode(1, false), None);
    }

    #[test]
    fn test_wheel_steps() {
        assert_eq!(wheel_steps(100.0, 0), 1.0);
        assert_eq!(wheel_steps(-100.0, 0), -1.0);
        assert!((wheel_steps(3.0, 1) - 0.48).abs() < 1e-6);
        assert_eq!(wheel_steps(10_000.0, 0), 5.0);
    }
}
