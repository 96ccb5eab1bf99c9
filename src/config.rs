//! Pipeline configuration (spec.md §6 "Configuration").
//!
//! Grounded in `CsgCompiler`'s constructor-then-configure style
//! (`CsgCompiler::new` / `with_subdivisions`) generalized to a single
//! `Deserialize`-able struct, and in `core-config` (oxidized)'s pattern of
//! loading an optional TOML file with unknown keys ignored.

use serde::{Deserialize, Serialize};

/// Axis handedness for the neutral coordinate frame (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoordinateSystem {
    RightHanded,
    LeftHanded,
}

/// Linear unit of the input/output geometry (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Mm,
    Inch,
}

/// Pipeline-wide configuration, recognized keys enumerated in spec.md §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    /// Mandatory-block violations raise instead of warning.
    pub strict_mode: bool,
    /// When `false`, only `{ST, EN, BO, AK, IK, SI, SC}` are accepted by C3.
    pub support_all_blocks: bool,
    /// Toggles the AK/IK closure check in C4.
    pub validate_contour_closure: bool,
    /// Closure and point-coincidence tolerance, in mm.
    pub geometry_tolerance: f64,
    /// Per-stage wall-clock budget, in milliseconds.
    pub stage_timeout_ms: u64,
    /// Rejects input larger than this many bytes before lexing.
    pub max_file_size_bytes: u64,
    pub enable_geometry_cache: bool,
    pub enable_debug_logs: bool,
    pub coordinate_system: CoordinateSystem,
    pub units: Units,
    pub feature_id_prefix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            strict_mode: false,
            support_all_blocks: true,
            validate_contour_closure: true,
            geometry_tolerance: 0.01,
            stage_timeout_ms: 5_000,
            max_file_size_bytes: 10 * 1024 * 1024,
            enable_geometry_cache: false,
            enable_debug_logs: false,
            coordinate_system: CoordinateSystem::RightHanded,
            units: Units::Mm,
            feature_id_prefix: "dstv".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Parse a TOML document into a config, starting from defaults for any
    /// field the document omits. Unknown keys are ignored for forward
    /// compatibility, matching `core-config`'s loader. The container-level
    /// `#[serde(default)]` above is what makes a partial document work:
    /// each omitted field falls back to `PipelineConfig::default()`'s value
    /// rather than erroring as a missing field.
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Load and parse a config from a file on disk.
    pub fn from_path(path: &std::path::Path) -> std::io::Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_spec() {
        let cfg = PipelineConfig::default();
        assert!(!cfg.strict_mode);
        assert!(cfg.support_all_blocks);
        assert_eq!(cfg.geometry_tolerance, 0.01);
    }

    #[test]
    fn partial_toml_overrides_only_named_fields() {
        let cfg = PipelineConfig::from_toml_str("strictMode = true\n").expect("parses");
        assert!(cfg.strict_mode);
        assert_eq!(cfg.geometry_tolerance, 0.01);
    }

    #[test]
    fn round_trips_through_a_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "strictMode = true\nunits = \"inch\"").expect("write");
        let cfg = PipelineConfig::from_path(file.path()).expect("load");
        assert!(cfg.strict_mode);
        assert_eq!(cfg.units, Units::Inch);
    }
}
