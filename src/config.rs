//! Viewer settings, read from a JSON file.

use std::path::Path;

use serde::Deserialize;

/// Everything the viewer binary needs to start: window, model file, shader
/// files and camera parameters. Absent fields fall back to the defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Path of the model file to load.
    pub model: String,
    pub vertex_shader: String,
    pub fragment_shader: String,
    pub geometry_shader: Option<String>,
    pub fov_degrees: f32,
    pub background: [f32; 3],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: "Meshview3D".to_string(),
            width: 1280,
            height: 720,
            model: "assets/models/backpack/backpack.obj".to_string(),
            vertex_shader: "assets/shaders/model/vert.glsl".to_string(),
            fragment_shader: "assets/shaders/model/frag.glsl".to_string(),
            geometry_shader: None,
            fov_degrees: 60.0,
            background: [0.1, 0.1, 0.2],
        }
    }
}

impl Settings {
    /// Parses settings from the JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
        serde_json::from_str(&text).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_fall_back_to_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "model": "scene.gltf", "width": 800 }"#).unwrap();
        assert_eq!(settings.model, "scene.gltf");
        assert_eq!(settings.width, 800);
        assert_eq!(settings.height, 720);
        assert_eq!(settings.geometry_shader, None);
        assert_eq!(settings.fov_degrees, 60.0);
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(Settings::load(Path::new("/nonexistent/settings.json")).is_err());
        let parsed: Result<Settings, _> = serde_json::from_str("{ width: }");
        assert!(parsed.is_err());
    }
}
