//! Tool-wide tunables grouped into one JSON document.

use std::path::Path;

use crate::background::BackgroundConfig;
use crate::decoder::DecoderConfig;
use crate::error::Error;
use crate::mesh::MeshLimits;

/// Every tunable the decode and cut paths read. Missing sections and
/// fields fall back to their defaults; unknown sections are rejected.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    pub decoder: DecoderConfig,
    pub background: BackgroundConfig,
    pub mesh: MeshLimits,
}

impl ToolConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, Error> {
        let cfg: Self =
            serde_json::from_str(raw).map_err(|e| Error::validation("config", e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load a config from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data).map_err(Into::into)
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.decoder.validate()?;
        self.background.validate()?;
        self.mesh.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_keeps_defaults() {
        let cfg = ToolConfig::from_json_str(r#"{"decoder": {"noise_scale": 0.25}}"#)
            .expect("config");
        assert_eq!(cfg.decoder.noise_scale, 0.25);
        assert_eq!(cfg.decoder.key_code_min, DecoderConfig::DEFAULT_KEY_CODE_MIN);
        assert_eq!(cfg.background.max_passes, BackgroundConfig::DEFAULT_MAX_PASSES);
        assert_eq!(cfg.mesh, MeshLimits::default());
    }

    #[test]
    fn unknown_section_is_rejected() {
        let err = ToolConfig::from_json_str(r#"{"camera": {}}"#).unwrap_err();
        assert!(err.to_string().contains("camera"));
    }

    #[test]
    fn out_of_range_values_fail_validation() {
        let err = ToolConfig::from_json_str(r#"{"mesh": {"min_triangles": 0}}"#).unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "mesh.min_triangles"));
        assert!(ToolConfig::from_json_str(r#"{"background": {"contrast_step": 0}}"#).is_err());
    }
}
