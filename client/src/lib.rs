pub mod editor;

use apl_core::{is_equal_rotation, Rotation};
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    #[cfg(feature = "browser_log")]
    let _ = console_log::init_with_level(log::Level::Debug);
}

/// Compare two saved rotations (JSON) the way the preset picker does
#[wasm_bindgen]
pub fn rotations_equal(a_json: &str, b_json: &str) -> Result<bool, String> {
    let a = Rotation::from_json(a_json).map_err(|e| format!("{}", e))?;
    let b = Rotation::from_json(b_json).map_err(|e| format!("{}", e))?;
    Ok(is_equal_rotation(&a, &b))
}
