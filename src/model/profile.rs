//! [`NormalizedProfile`], the final output of the C5 normalizer.

use super::feature::NormalizedFeature;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Closed set of normalized profile types (spec.md §3, mapped from
/// `ProfileTypeCode` in §4.5.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileType {
    IProfile,
    UProfile,
    LProfile,
    TProfile,
    ZProfile,
    CProfile,
    TubeRect,
    TubeRound,
    Plate,
    FlatBar,
    Pipe,
}

/// Known steel-grade mechanical properties (spec.md §4.5.1 fixed table).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialProperties {
    pub grade: String,
    pub yield_strength: Option<f64>,
    pub tensile_strength: Option<f64>,
    pub density: Option<f64>,
}

/// Cross-section dimensions, profile-type-dependent keys (height, width,
/// web/flange/wall thickness, root radius, ...), plus the overall length.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDimensions {
    pub length: f64,
    pub cross_section: HashMap<String, f64>,
}

impl ProfileDimensions {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.cross_section.get(key).copied()
    }
}

/// Provenance fields carried through from the ST block, unmodified by
/// normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provenance {
    pub order_number: String,
    pub drawing_number: String,
    pub phase_number: String,
    pub piece_number: String,
    pub profile_name: String,
    pub quantity: i64,
    pub created_date: Option<String>,
    pub original_format: String,
}

/// The single normalized scene description produced by a pipeline run
/// (spec.md §3). Owns its features; features reference it only via
/// `metadata` bookkeeping, never a back-pointer, so there are no cycles
/// (spec.md §9 "Ownership").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedProfile {
    pub id: String,
    pub display_name: String,
    pub profile_type: ProfileType,
    pub material: MaterialProperties,
    pub dimensions: ProfileDimensions,
    pub features: Vec<NormalizedFeature>,
    pub provenance: Provenance,
}
