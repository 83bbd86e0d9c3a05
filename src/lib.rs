pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod model;
pub mod scale;

use wasm_bindgen::prelude::*;

pub use config::{CostWeights, LayoutConfig};
pub use error::LayoutError;
pub use layout::{LayoutEngine, TimelineLayout};
pub use model::{Entity, Era, Link, LinkKind, TimelineInput};
pub use scale::{TimeScale, YearRange};

/// Initialize panic hook and log forwarding for WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    }
}

/// Parse input JSON, lay it out, and serialize the result.
pub fn layout_json(input: &str, config: Option<&str>) -> Result<String, LayoutError> {
    let config = match config {
        Some(source) => LayoutConfig::from_json(source)?,
        None => LayoutConfig::default(),
    };
    let input = TimelineInput::from_json(input)?;
    let layout = LayoutEngine::new(config)?.layout(&input)?;
    Ok(serde_json::to_string(&layout)?)
}

/// Compute a timeline layout from `{nodes, links}` JSON
#[wasm_bindgen(js_name = "computeTimelineLayout")]
pub fn compute_timeline_layout(
    input_json: &str,
    config_json: Option<String>,
) -> Result<String, String> {
    layout_json(input_json, config_json.as_deref()).map_err(|e| e.to_string())
}
