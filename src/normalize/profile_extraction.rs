//! §4.5.1 — profile extraction: the ST block becomes `currentDimensions` /
//! `currentProfileType`, consulted by every subsequent feature conversion.

use crate::model::{MaterialProperties, ProfileDimensions, ProfileType, ProfileTypeCode, Provenance, StData};
use std::collections::HashMap;

/// `{I↦IProfile, U↦UProfile, L↦LProfile, T↦TProfile, Z↦ZProfile, C↦CProfile,
/// M↦TubeRect, R↦TubeRound, P↦Pipe, B↦Plate}` (spec.md §4.5.1).
pub fn profile_type_from_code(code: ProfileTypeCode) -> ProfileType {
    match code {
        ProfileTypeCode::I => ProfileType::IProfile,
        ProfileTypeCode::U => ProfileType::UProfile,
        ProfileTypeCode::L => ProfileType::LProfile,
        ProfileTypeCode::T => ProfileType::TProfile,
        ProfileTypeCode::Z => ProfileType::ZProfile,
        ProfileTypeCode::C => ProfileType::CProfile,
        ProfileTypeCode::M => ProfileType::TubeRect,
        ProfileTypeCode::R => ProfileType::TubeRound,
        ProfileTypeCode::P => ProfileType::Pipe,
        ProfileTypeCode::B => ProfileType::Plate,
    }
}

/// Fallback when the ST block carries no one-letter type code (spec.md
/// §4.5.1: "fall back to pattern-matching on profileName").
pub fn profile_type_from_name(name: &str) -> ProfileType {
    let upper = name.to_ascii_uppercase();
    if upper.starts_with("IPE") || upper.starts_with("HE") || upper.starts_with('I') {
        ProfileType::IProfile
    } else if upper.starts_with('U') || upper.starts_with("UPN") {
        ProfileType::UProfile
    } else if upper.starts_with('L') {
        ProfileType::LProfile
    } else if upper.starts_with("HSS") || upper.starts_with("RHS") || upper.starts_with('M') {
        ProfileType::TubeRect
    } else if upper.starts_with("CHS") || upper.starts_with('R') {
        ProfileType::TubeRound
    } else if upper.starts_with("PL") || upper.starts_with('B') {
        ProfileType::Plate
    } else {
        ProfileType::FlatBar
    }
}

/// Field-order tables from spec.md §4.3 "ST (...)" rows, applied to
/// `geometric_fields` (already stripped of the non-geometric prefix and the
/// type code by the parser).
pub fn dimensions_for(profile_type: ProfileType, fields: &[f64]) -> ProfileDimensions {
    let get = |i: usize| fields.get(i).copied().unwrap_or(0.0);
    let mut cross_section = HashMap::new();

    let length = match profile_type {
        ProfileType::Plate | ProfileType::FlatBar => {
            // §4.5.1: "DSTV 'height' field is the plate length" — field 0
            // after the type code is the length-as-height slot.
            get(0)
        }
        _ => get(0),
    };

    match profile_type {
        ProfileType::IProfile | ProfileType::UProfile | ProfileType::TProfile | ProfileType::ZProfile | ProfileType::CProfile => {
            cross_section.insert("height".to_string(), get(1));
            cross_section.insert("width".to_string(), get(2));
            cross_section.insert("flangeThickness".to_string(), get(3));
            cross_section.insert("webThickness".to_string(), get(4));
            cross_section.insert("rootRadius".to_string(), get(5));
            cross_section.insert("weightPerMeter".to_string(), get(6));
            cross_section.insert("surfaceArea".to_string(), get(7));
        }
        ProfileType::TubeRect | ProfileType::TubeRound | ProfileType::Pipe => {
            cross_section.insert("height".to_string(), get(1));
            cross_section.insert("width".to_string(), get(2));
            cross_section.insert("wallThickness".to_string(), get(3));
            cross_section.insert("wallThickness2".to_string(), get(4));
            cross_section.insert("rootRadius".to_string(), get(5));
            cross_section.insert("weightPerMeter".to_string(), get(6));
            cross_section.insert("surfaceArea".to_string(), get(7));
        }
        ProfileType::LProfile => {
            cross_section.insert("height".to_string(), get(1));
            cross_section.insert("width".to_string(), get(2));
            cross_section.insert("thickness".to_string(), get(3));
            cross_section.insert("rootRadius".to_string(), get(4));
            cross_section.insert("weightPerMeter".to_string(), get(5));
            cross_section.insert("surfaceArea".to_string(), get(6));
        }
        ProfileType::Plate | ProfileType::FlatBar => {
            // §4.5.1: "'rootRadius-position' field is the plate thickness".
            cross_section.insert("width".to_string(), get(1));
            cross_section.insert("thickness".to_string(), get(2));
        }
    }

    ProfileDimensions { length, cross_section }
}

/// Fixed steel-grade property table (spec.md §4.5.1); unknown grades leave
/// yield/tensile/density unset rather than guessing.
pub fn material_for_grade(grade: &str) -> MaterialProperties {
    let (yield_strength, tensile_strength, density) = match grade.trim().to_ascii_uppercase().as_str() {
        "S235" => (Some(235.0), Some(360.0), Some(7850.0)),
        "S275" => (Some(275.0), Some(430.0), Some(7850.0)),
        "S355" => (Some(355.0), Some(510.0), Some(7850.0)),
        _ => (None, None, None),
    };
    MaterialProperties {
        grade: grade.to_string(),
        yield_strength,
        tensile_strength,
        density,
    }
}

pub fn provenance_from(st: &StData) -> Provenance {
    Provenance {
        order_number: st.order_number.clone(),
        drawing_number: st.drawing_number.clone(),
        phase_number: st.phase_number.clone(),
        piece_number: st.piece_number.clone(),
        profile_name: st.profile_name.clone(),
        quantity: st.quantity,
        created_date: None,
        original_format: "DSTV".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn i_profile_field_order() {
        let fields = vec![1000.0, 200.0, 100.0, 5.6, 8.5, 12.0, 0.0, 0.0];
        let dims = dimensions_for(ProfileType::IProfile, &fields);
        assert_eq!(dims.length, 1000.0);
        assert_eq!(dims.get("height"), Some(200.0));
        // §4.3 "ST (IProfile etc.)": field 11 = flangeThickness precedes
        // field 12 = webThickness, so flangeThickness is `get(3)` = 5.6 for
        // this input, not 8.5.
        assert_eq!(dims.get("flangeThickness"), Some(5.6));
        assert_eq!(dims.get("webThickness"), Some(8.5));
    }

    #[test]
    fn plate_remaps_height_and_root_radius_slots() {
        let fields = vec![2000.0, 500.0, 12.0];
        let dims = dimensions_for(ProfileType::Plate, &fields);
        assert_eq!(dims.length, 2000.0);
        assert_eq!(dims.get("width"), Some(500.0));
        assert_eq!(dims.get("thickness"), Some(12.0));
    }

    #[test]
    fn unknown_grade_leaves_properties_unset() {
        let mat = material_for_grade("X999");
        assert!(mat.yield_strength.is_none());
    }
}
