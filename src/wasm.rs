use wasm_bindgen::prelude::*;

/// Export a JSON conversation to PNG bytes. Stickers must be data URIs or
/// raw base64.
#[wasm_bindgen]
pub fn export_png(json: &str) -> Result<Vec<u8>, JsValue> {
    crate::render_json(json).map_err(|e| JsValue::from_str(&e.to_string()))
}
