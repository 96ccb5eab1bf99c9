//! C6 — coordinate service (spec.md §4.6).
//!
//! Two pure conversions shared by every block-specific normalizer rule:
//! [`convert_position`] (DSTV local coordinates → neutral frame) and
//! [`convert_face`] (DSTV face code → neutral face tag). Neither function
//! holds state; the profile-dependent behavior comes entirely from the
//! `ConversionContext` passed in, matching §9 "Shared-context state: prefer
//! explicit threading over globals."

use crate::model::{FaceCode, NeutralFace, ProfileDimensions, ProfileType};

/// What kind of feature a coordinate belongs to, since §4.6's conversion
/// table and the marking face override (§4.6, §9 OQ-4) both key off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Hole,
    Marking,
    Cut,
    Contour,
    Other,
}

/// Context a single coordinate/face conversion needs: the profile it
/// belongs to and, where relevant, the feature kind and DSTV face it came
/// from.
pub struct ConversionContext<'a> {
    pub profile_type: ProfileType,
    pub dimensions: &'a ProfileDimensions,
    pub face: Option<FaceCode>,
    pub feature_type: FeatureKind,
}

/// Neutral-frame position plus the resolved neutral face, returned together
/// because for markings the face resolution depends on the same
/// `feature_type`/`face` inputs as the position (spec.md §4.6).
pub struct Converted {
    pub position: (f64, f64, f64),
    pub face: Option<NeutralFace>,
}

/// Convert a DSTV-local coordinate triple to the neutral frame (spec.md
/// §4.6 item 1): origin at piece-length midpoint, X along length, Y up, Z
/// transverse, right-handed, millimeters.
///
/// The conversion formula depends on `(profile_type, face, feature_type)`:
/// tubes and angle profiles pass through unchanged (their DSTV frame is
/// already piece-start-origin, length-aligned); plates swap X/Z for
/// markings on the top face with Y pinned to 0; I/U-profiles shift X by
/// `-length/2` to re-center the origin and offset Y by half the flange
/// thickness so the web sits on the neutral Y=0 plane.
pub fn convert_position(dstv: (f64, f64, Option<f64>), ctx: &ConversionContext) -> Converted {
    let (x, y, z) = (dstv.0, dstv.1, dstv.2.unwrap_or(0.0));
    let face = convert_face(ctx.face, ctx);

    let position = match ctx.profile_type {
        ProfileType::TubeRect | ProfileType::TubeRound | ProfileType::Pipe => {
            let length = ctx.dimensions.length;
            (x - length / 2.0, y, z)
        }
        ProfileType::LProfile | ProfileType::CProfile | ProfileType::ZProfile => {
            let length = ctx.dimensions.length;
            (x - length / 2.0, y, z)
        }
        ProfileType::Plate | ProfileType::FlatBar => {
            if ctx.feature_type == FeatureKind::Marking && matches!(ctx.face, Some(FaceCode::V) | Some(FaceCode::O)) {
                let length = ctx.dimensions.length;
                (x - length / 2.0, 0.0, y)
            } else {
                let length = ctx.dimensions.length;
                (x - length / 2.0, y, z)
            }
        }
        ProfileType::IProfile | ProfileType::UProfile | ProfileType::TProfile => {
            let length = ctx.dimensions.length;
            if ctx.feature_type == FeatureKind::Marking && ctx.face == Some(FaceCode::V) {
                // §4.6: "For markings, `v` maps to TopFlange (visibility)
                // but convertPosition preserves the DSTV X directly" — an
                // intentional override (spec.md §9 OQ-4), so X is *not*
                // re-centered here; only documented as such.
                (x, y, z)
            } else {
                let flange = ctx.dimensions.get("flangeThickness").unwrap_or(0.0);
                (x - length / 2.0, y + flange / 2.0, z)
            }
        }
    };

    Converted { position, face }
}

/// Convert a DSTV face code to the neutral face taxonomy (spec.md §4.6
/// item 2, table). Markings on `v` resolve to `TopFlange` for I/U-profiles
/// regardless of the strict "web" meaning `v` carries on BO blocks — the
/// visibility override from §9 OQ-4.
pub fn convert_face(code: Option<FaceCode>, ctx: &ConversionContext) -> Option<NeutralFace> {
    let code = code?;
    Some(match ctx.profile_type {
        ProfileType::IProfile | ProfileType::UProfile | ProfileType::TProfile => match code {
            FaceCode::V => {
                if ctx.feature_type == FeatureKind::Marking {
                    NeutralFace::TopFlange
                } else {
                    NeutralFace::Web
                }
            }
            FaceCode::U => NeutralFace::BottomFlange,
            FaceCode::O => NeutralFace::Web,
            FaceCode::H => NeutralFace::Web,
        },
        ProfileType::TubeRect | ProfileType::TubeRound | ProfileType::Pipe => match code {
            FaceCode::V => NeutralFace::Front,
            FaceCode::U => NeutralFace::Bottom,
            FaceCode::O => NeutralFace::Top,
            FaceCode::H => NeutralFace::Back,
        },
        ProfileType::Plate | ProfileType::FlatBar => match code {
            FaceCode::V => NeutralFace::Top,
            FaceCode::U => NeutralFace::Bottom,
            FaceCode::O => NeutralFace::Top,
            FaceCode::H => NeutralFace::Bottom,
        },
        ProfileType::LProfile | ProfileType::CProfile | ProfileType::ZProfile => NeutralFace::Web,
    })
}

/// Is `face` a value the given profile type ever produces (spec.md §3
/// invariant 2: "Every feature's face, if set, is valid for its profile
/// type")? Used by the validator's inter-block pass and by normalizer
/// assertions in debug builds.
pub fn is_face_valid_for_profile(face: NeutralFace, profile_type: ProfileType) -> bool {
    match profile_type {
        ProfileType::IProfile | ProfileType::UProfile | ProfileType::TProfile => {
            matches!(face, NeutralFace::Web | NeutralFace::TopFlange | NeutralFace::BottomFlange)
        }
        ProfileType::TubeRect | ProfileType::TubeRound | ProfileType::Pipe => {
            matches!(face, NeutralFace::Front | NeutralFace::Back | NeutralFace::Top | NeutralFace::Bottom)
        }
        ProfileType::Plate | ProfileType::FlatBar => matches!(face, NeutralFace::Top | NeutralFace::Bottom),
        ProfileType::LProfile | ProfileType::CProfile | ProfileType::ZProfile => face == NeutralFace::Web,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn dims(length: f64) -> ProfileDimensions {
        ProfileDimensions {
            length,
            cross_section: HashMap::new(),
        }
    }

    #[test]
    fn tube_face_v_maps_to_front() {
        let d = dims(1000.0);
        let ctx = ConversionContext {
            profile_type: ProfileType::TubeRect,
            dimensions: &d,
            face: Some(FaceCode::V),
            feature_type: FeatureKind::Hole,
        };
        assert_eq!(convert_face(Some(FaceCode::V), &ctx), Some(NeutralFace::Front));
    }

    #[test]
    fn iprofile_hole_on_web_centers_x() {
        let d = dims(1000.0);
        let ctx = ConversionContext {
            profile_type: ProfileType::IProfile,
            dimensions: &d,
            face: Some(FaceCode::V),
            feature_type: FeatureKind::Hole,
        };
        let out = convert_position((500.0, 100.0, None), &ctx);
        assert!((out.position.0 - 0.0).abs() < 1e-9);
        assert_eq!(out.face, Some(NeutralFace::Web));
    }

    #[test]
    fn iprofile_marking_on_v_keeps_raw_x_and_maps_to_top_flange() {
        let d = dims(1000.0);
        let ctx = ConversionContext {
            profile_type: ProfileType::IProfile,
            dimensions: &d,
            face: Some(FaceCode::V),
            feature_type: FeatureKind::Marking,
        };
        let out = convert_position((2.0, 2.0, None), &ctx);
        assert_eq!(out.position, (2.0, 2.0, 0.0));
        assert_eq!(out.face, Some(NeutralFace::TopFlange));
    }

    #[test]
    fn plate_marking_on_top_swaps_y_and_z() {
        let d = dims(2000.0);
        let ctx = ConversionContext {
            profile_type: ProfileType::Plate,
            dimensions: &d,
            face: Some(FaceCode::V),
            feature_type: FeatureKind::Marking,
        };
        let out = convert_position((100.0, 50.0, None), &ctx);
        assert_eq!(out.position.1, 0.0);
        assert_eq!(out.position.2, 50.0);
    }

    #[test]
    fn face_validity_rejects_top_flange_on_tube() {
        assert!(!is_face_valid_for_profile(NeutralFace::TopFlange, ProfileType::TubeRect));
        assert!(is_face_valid_for_profile(NeutralFace::Top, ProfileType::TubeRect));
    }
}
