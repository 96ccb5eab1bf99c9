//! C7 — feature-priority ordering (spec.md §4.7).
//!
//! A stable sort on `metadata.processing_priority`
//! (`PR=0 < AK/IK=1 < SC=3 < BO=4 < SI=5 < PU=6 < KO=7 < others=8`, spec.md
//! §3 invariant 9), preserving original relative order among equal
//! priorities — `sort_by_key` on `Vec` is a stable sort in Rust's standard
//! library, so no custom merge step is needed.

use crate::model::NormalizedFeature;

pub fn order_features(mut features: Vec<NormalizedFeature>) -> Vec<NormalizedFeature> {
    features.sort_by_key(|f| f.metadata.processing_priority);
    features
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FeatureMetadata, FeatureParameters, FeatureType, NormalizedFeature};

    fn feature(id: &str, priority: u8) -> NormalizedFeature {
        NormalizedFeature {
            id: id.to_string(),
            feature_type: FeatureType::Hole,
            coordinates: (0.0, 0.0, 0.0),
            face: None,
            parameters: FeatureParameters::Hole {
                diameter: 10.0,
                depth: 0.0,
                angle: None,
            },
            metadata: FeatureMetadata {
                original_block_type: "BO".to_string(),
                original_dstv_coords: (0.0, 0.0, None),
                work_plane: None,
                processing_priority: priority,
                apply_only: false,
                detected_as: Vec::new(),
            },
            geometry: None,
        }
    }

    #[test]
    fn sorts_by_priority_preserving_stability() {
        let features = vec![feature("b", 4), feature("a1", 1), feature("a2", 1), feature("c", 6)];
        let sorted = order_features(features);
        let ids: Vec<&str> = sorted.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2", "b", "c"]);
    }
}
