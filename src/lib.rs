use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{WebGl2RenderingContext, HtmlCanvasElement};

pub mod camera;
pub mod config;
pub mod data;
pub mod host;
pub mod math;
pub mod mesh;
pub mod render;
pub mod scene;

pub use config::{ConfigError, SceneConfig};
pub use host::mount;

use camera::OrbitCamera;
use math::Vec3;
use render::RenderPipeline;
use scene::{CanopySurface, OrnamentFactory, TreeBuilder};

/// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // A second bundle on the same page keeps the first logger
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Scene state exposed to JavaScript
///
/// Owns the GPU resources and camera for one canvas. Hosts either call
/// `mount`, which wires everything to the page, or drive `render` from their
/// own `requestAnimationFrame` loop.
#[wasm_bindgen]
pub struct FruitTreeScene {
    canvas: HtmlCanvasElement,
    pipeline: RenderPipeline,
    camera: OrbitCamera,
    surface: CanopySurface,
    ornament_factory: OrnamentFactory,
    /// One entry per placed ornament
    ornament_positions: Vec<Vec3>,
    fruit_endpoint: String,
    time: f32,
    // Canvas size in CSS pixels
    width: i32,
    height: i32,
}

#[wasm_bindgen]
impl FruitTreeScene {
    /// Create a scene with the default configuration
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement) -> Result<FruitTreeScene, JsValue> {
        Self::build(canvas, SceneConfig::default())
    }

    /// Create a scene from YAML overrides of the default configuration
    #[wasm_bindgen]
    pub fn with_config(canvas: HtmlCanvasElement, yaml: &str) -> Result<FruitTreeScene, JsValue> {
        let config = SceneConfig::from_yaml(yaml)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Self::build(canvas, config)
    }

    /// Place `count` ornaments on the canopy, replacing any placed before
    #[wasm_bindgen]
    pub fn place_ornaments(&mut self, count: usize) -> Result<(), JsValue> {
        let positions = self.surface.placements(count);
        let parts = self.ornament_factory.build_parts(&positions);

        self.pipeline.upload_ornaments(&parts)
            .map_err(|e| JsValue::from_str(&e))?;

        log::info!("Placed {} ornaments on the canopy", positions.len());
        self.ornament_positions = positions;
        Ok(())
    }

    /// Place one ornament per record in a `{"fruits": [...]}` body
    ///
    /// Malformed data places nothing. Returns the number placed.
    #[wasm_bindgen]
    pub fn load_fruits_json(&mut self, json: &str) -> Result<usize, JsValue> {
        let count = data::count_or_zero(data::FruitList::from_json(json));
        self.place_ornaments(count)?;
        Ok(count)
    }

    #[wasm_bindgen]
    pub fn ornament_count(&self) -> usize {
        self.ornament_positions.len()
    }

    /// Ornament positions as a flat `[x0, y0, z0, x1, ...]` array
    #[wasm_bindgen]
    pub fn ornament_positions(&self) -> Vec<f32> {
        self.ornament_positions
            .iter()
            .flat_map(|p| p.to_array())
            .collect()
    }

    /// Whether frames include the key-light shadow pass
    #[wasm_bindgen]
    pub fn shadows_active(&self) -> bool {
        self.pipeline.shadows_active()
    }

    #[wasm_bindgen]
    pub fn fruit_endpoint(&self) -> String {
        self.fruit_endpoint.clone()
    }

    /// Advance the camera and draw one frame
    #[wasm_bindgen]
    pub fn render(&mut self, dt: f32) {
        self.time += dt;
        self.camera.update();
        self.pipeline.render(&self.camera);
    }

    /// Resize to `width` x `height` CSS pixels
    #[wasm_bindgen]
    pub fn resize(&mut self, width: i32, height: i32) -> Result<(), JsValue> {
        let ratio = web_sys::window()
            .map(|w| w.device_pixel_ratio())
            .unwrap_or(1.0);
        let (buffer_width, buffer_height) = drawing_buffer_size(width, height, ratio);

        self.canvas.set_width(buffer_width);
        self.canvas.set_height(buffer_height);
        let style = self.canvas.style();
        style.set_property("width", &format!("{}px", width.max(1)))?;
        style.set_property("height", &format!("{}px", height.max(1)))?;

        self.width = width.max(1);
        self.height = height.max(1);
        self.pipeline.resize(buffer_width as i32, buffer_height as i32);
        log::debug!("Resized to {}x{} ({}x{} device px)", width, height, buffer_width, buffer_height);
        Ok(())
    }

    /// Orbit by a pointer drag in CSS pixels
    #[wasm_bindgen]
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32) {
        self.camera.rotate(delta_x, delta_y, self.height as f32);
    }

    /// Zoom; positive moves away from the tree
    #[wasm_bindgen]
    pub fn zoom(&mut self, delta: f32) {
        self.camera.zoom(delta);
    }

    /// Pan by a pointer drag in CSS pixels
    #[wasm_bindgen]
    pub fn pan(&mut self, delta_x: f32, delta_y: f32) {
        self.camera.pan(delta_x, delta_y, self.height as f32);
    }

    /// Seconds rendered since creation
    #[wasm_bindgen]
    pub fn elapsed(&self) -> f32 {
        self.time
    }
}

impl FruitTreeScene {
    /// Set up camera, lights, and static geometry on `canvas`
    pub fn build(canvas: HtmlCanvasElement, config: SceneConfig) -> Result<FruitTreeScene, JsValue> {
        let width = canvas.width() as i32;
        let height = canvas.height() as i32;

        let options = js_sys::Object::new();
        js_sys::Reflect::set(&options, &"antialias".into(), &JsValue::TRUE)?;
        let gl = canvas
            .get_context_with_context_options("webgl2", &options)?
            .ok_or("Failed to get WebGL2 context")?
            .dyn_into::<WebGl2RenderingContext>()?;

        let mut pipeline = RenderPipeline::new(gl, width, height, config.lighting)
            .map_err(|e| JsValue::from_str(&e))?;

        let parts = TreeBuilder::new(&config.tree).build().into_parts();
        pipeline.upload_scenery(&parts)
            .map_err(|e| JsValue::from_str(&e))?;

        Ok(Self {
            canvas,
            pipeline,
            camera: OrbitCamera::new(config.camera),
            surface: CanopySurface::new(config.canopy),
            ornament_factory: OrnamentFactory::new(config.ornament),
            ornament_positions: Vec::new(),
            fruit_endpoint: config.fruit_endpoint,
            time: 0.0,
            width: width.max(1),
            height: height.max(1),
        })
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }
}

/// Device-pixel size of the drawing buffer for a CSS-pixel viewport
fn drawing_buffer_size(width: i32, height: i32, pixel_ratio: f64) -> (u32, u32) {
    let ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 { pixel_ratio } else { 1.0 };
    let scale = |v: i32| ((v.max(1) as f64) * ratio).round().max(1.0) as u32;
    (scale(width), scale(height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drawing_buffer_size() {
        assert_eq!(drawing_buffer_size(800, 500, 1.0), (800, 500));
        assert_eq!(drawing_buffer_size(800, 500, 2.0), (1600, 1000));
        assert_eq!(drawing_buffer_size(333, 101, 1.5), (500, 152));
    }

    #[test]
    fn test_drawing_buffer_size_guards_bad_input() {
        assert_eq!(drawing_buffer_size(0, -5, 1.0), (1, 1));
        assert_eq!(drawing_buffer_size(640, 480, f64::NAN), (640, 480));
        assert_eq!(drawing_buffer_size(640, 480, 0.0), (640, 480));
    }
}
