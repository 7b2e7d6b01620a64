//! Small shared helpers.

use std::path::Path;

/// Create `path` and its parents if missing.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// `"on"` / `"off"` for boolean settings in status output.
pub fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
