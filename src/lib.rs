pub mod error;
pub mod ir;
pub mod layout;
pub mod measure;

use wasm_bindgen::prelude::*;

use error::LayoutError;
use ir::{ArrangeOutput, ModelIR};
use layout::{LayoutConfig, LayoutEngine};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Arrange a parsed model and return positions plus user-facing warnings.
pub fn arrange(model: &ModelIR, config: &LayoutConfig) -> Result<ArrangeOutput, LayoutError> {
    let result = LayoutEngine::new(config.clone()).layout(model)?;
    Ok(result.output())
}

/// JSON in, JSON out.
pub fn arrange_json(model_json: &str, config: &LayoutConfig) -> Result<String, LayoutError> {
    let model: ModelIR = serde_json::from_str(model_json)?;
    let output = arrange(&model, config)?;
    Ok(serde_json::to_string(&output)?)
}

/// Arrange a model given as JSON, with an optional JSON configuration
#[wasm_bindgen(js_name = "autoArrange")]
pub fn auto_arrange(model_json: &str, config_json: Option<String>) -> Result<String, String> {
    let config = match config_json.as_deref() {
        Some(json) if !json.trim().is_empty() => {
            serde_json::from_str(json).map_err(|e| format!("invalid configuration: {e}"))?
        }
        _ => LayoutConfig::default(),
    };

    arrange_json(model_json, &config).map_err(|e| e.to_string())
}
