//! Settings file loading

use crate::StorageResult;
use log::info;
use std::fs;
use std::path::Path;
use vical_core::Settings;

/// Loads settings from a JSON object
///
/// A missing file yields the defaults, as does any key the file leaves
/// out. Malformed JSON is an error rather than a silent fallback.
pub fn load_settings(path: &Path) -> StorageResult<Settings> {
    if !path.exists() {
        info!(
            "event=settings_default module=settings_file path={}",
            path.display()
        );
        return Ok(Settings::default());
    }
    let bytes = fs::read(path)?;
    let settings: Settings = serde_json::from_slice(&bytes)?;
    info!(
        "event=settings_loaded module=settings_file path={} date_format={}",
        path.display(),
        settings.date_format.as_str()
    );
    Ok(settings)
}
