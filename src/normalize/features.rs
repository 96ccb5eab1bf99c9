//! §4.5.2 — per-block feature normalization for every block type except AK
//! (handled by [`super::classifier`]) and ST/EN (consumed by
//! [`super::profile_extraction`]).

use super::{FeatureCtx, IdGenerator};
use crate::coordinate::{convert_position, ConversionContext, FeatureKind};
use crate::model::{
    BoData, Diagnostic, FaceCode, FeatureMetadata, FeatureParameters, FeatureType, GenericData, KoData,
    NeutralFace, NormalizedFeature, ProfileType, PuData, RawPoint, ScData, SiData,
};

fn convert(ctx: &FeatureCtx, coords: (f64, f64, Option<f64>), face: Option<FaceCode>, kind: FeatureKind) -> ((f64, f64, f64), Option<NeutralFace>) {
    let conv_ctx = ConversionContext {
        profile_type: ctx.profile_type,
        dimensions: ctx.dimensions,
        face,
        feature_type: kind,
    };
    let converted = convert_position(coords, &conv_ctx);
    (converted.position, converted.face)
}

fn metadata(original_block_type: &str, coords: (f64, f64, Option<f64>), priority: u8, apply_only: bool) -> FeatureMetadata {
    FeatureMetadata {
        original_block_type: original_block_type.to_string(),
        original_dstv_coords: coords,
        work_plane: None,
        processing_priority: priority,
        apply_only,
        detected_as: Vec::new(),
    }
}

pub fn normalize_bo(
    data: &BoData,
    ctx: &FeatureCtx,
    ids: &mut IdGenerator,
    _diagnostics: &mut Vec<Diagnostic>,
) -> Vec<NormalizedFeature> {
    data.holes
        .iter()
        .filter(|h| h.diameter > 0.0)
        .map(|h| {
            let (position, face) = convert(ctx, (h.x, h.y, Some(0.0)), h.face, FeatureKind::Hole);
            NormalizedFeature {
                id: ids.next("hole"),
                feature_type: FeatureType::Hole,
                coordinates: position,
                face,
                parameters: FeatureParameters::Hole {
                    diameter: h.diameter,
                    depth: h.depth,
                    angle: h.angle,
                },
                metadata: metadata("BO", (h.x, h.y, Some(0.0)), FeatureType::Hole.processing_priority(), true),
                geometry: None,
            }
        })
        .collect()
}

pub fn normalize_ik(
    points: &[RawPoint],
    face: Option<FaceCode>,
    ctx: &FeatureCtx,
    ids: &mut IdGenerator,
) -> Vec<NormalizedFeature> {
    if points.is_empty() {
        return Vec::new();
    }
    let anchor = points[0];
    let (position, resolved_face) = convert(ctx, (anchor.x, anchor.y, anchor.z), face, FeatureKind::Contour);
    let feature_points = points
        .iter()
        .map(|p| {
            let (pos, _) = convert(ctx, (p.x, p.y, p.z), face, FeatureKind::Contour);
            crate::model::FeaturePoint { x: pos.0, y: pos.1, z: pos.2 }
        })
        .collect();
    vec![NormalizedFeature {
        id: ids.next("contour"),
        feature_type: FeatureType::Contour,
        coordinates: position,
        face: resolved_face,
        parameters: FeatureParameters::Contour {
            points: feature_points,
            closed: true,
            orientation_warning: false,
        },
        metadata: metadata("IK", (anchor.x, anchor.y, anchor.z), 2, false),
        geometry: None,
    }]
}

pub fn normalize_si(data: &SiData, ctx: &FeatureCtx, ids: &mut IdGenerator) -> Vec<NormalizedFeature> {
    // §4.5.2: flange-face markings on non-plate pass through untransformed;
    // plate-web markings swap Y/Z; everything else gets the full C6
    // transform. `convert_position` already encodes the per-profile-type
    // rules (including the I-profile `v` visibility override), so the only
    // special case left here is "non-plate, face in {v,u}" passthrough,
    // which for I/U-profiles is exactly what `convert_position`'s marking
    // branch already does.
    let (position, face) = convert(ctx, (data.x, data.y, Some(data.z)), data.face, FeatureKind::Marking);

    let (web_thickness, flange_thickness) = match ctx.profile_type {
        ProfileType::IProfile | ProfileType::UProfile | ProfileType::TProfile => (
            ctx.dimensions.get("webThickness"),
            ctx.dimensions.get("flangeThickness"),
        ),
        _ => (None, None),
    };

    vec![NormalizedFeature {
        id: ids.next("marking"),
        feature_type: FeatureType::Marking,
        coordinates: position,
        face,
        parameters: FeatureParameters::Marking {
            text: data.text.clone(),
            text_height: data.text_height,
            angle: data.angle,
            web_thickness,
            flange_thickness,
        },
        metadata: metadata("SI", (data.x, data.y, Some(data.z)), FeatureType::Marking.processing_priority(), true),
        geometry: None,
    }]
}

pub fn normalize_sc(data: &ScData, ctx: &FeatureCtx, ids: &mut IdGenerator) -> Vec<NormalizedFeature> {
    if data.width <= 0.0 || data.height <= 0.0 {
        return Vec::new();
    }
    // §4.5.2: "Direct (x,y,0)" — no coordinate-service transform for cuts.
    let position = (data.x, data.y, 0.0);
    vec![NormalizedFeature {
        id: ids.next("cut"),
        feature_type: FeatureType::Cut,
        coordinates: position,
        face: None,
        parameters: FeatureParameters::Cut {
            cut_type: crate::model::CutKind::Straight,
            width: Some(data.width),
            height: Some(data.height),
            angle: data.angle,
        },
        metadata: metadata("SC", (data.x, data.y, None), FeatureType::Cut.processing_priority(), false),
        geometry: Some(crate::model::FeatureGeometry {
            bounds_min: (data.x, data.y),
            bounds_max: (data.x + data.width, data.y + data.height),
            area: Some(data.width * data.height),
            perimeter: Some(2.0 * (data.width + data.height)),
        }),
    }]
}

pub fn normalize_pu(data: &PuData, ids: &mut IdGenerator) -> Vec<NormalizedFeature> {
    let position = (data.x, data.y, 0.0);
    vec![NormalizedFeature {
        id: ids.next("punch"),
        feature_type: FeatureType::Punch,
        coordinates: position,
        face: None,
        parameters: FeatureParameters::Punch {
            diameter: data.diameter,
            depth: data.depth,
        },
        metadata: metadata("PU", (data.x, data.y, None), FeatureType::Punch.processing_priority(), false),
        geometry: None,
    }]
}

pub fn normalize_ko(data: &KoData, ids: &mut IdGenerator) -> Vec<NormalizedFeature> {
    if data.points.is_empty() {
        return Vec::new();
    }
    let cx = data.points.iter().map(|p| p.x).sum::<f64>() / data.points.len() as f64;
    let cy = data.points.iter().map(|p| p.y).sum::<f64>() / data.points.len() as f64;
    let points = data
        .points
        .iter()
        .map(|p| crate::model::FeaturePoint { x: p.x, y: p.y, z: p.z.unwrap_or(0.0) })
        .collect();
    vec![NormalizedFeature {
        id: ids.next("markingcontour"),
        feature_type: FeatureType::Marking,
        coordinates: (cx, cy, 0.0),
        face: None,
        parameters: FeatureParameters::UnrestrictedContour { points },
        // §3 invariant 9: ContourMarking(KO)=7, distinct from SI's 5 even
        // though both map to `FeatureType::Marking` — overridden the same
        // way `normalize_ik` hardcodes IK's 2 below.
        metadata: metadata("KO", (cx, cy, None), 7, false),
        geometry: None,
    }]
}

/// Generic block types whose layout this crate does not interpret (TO, UE,
/// PR, KA, BR, VO, NU, FP, LP, RT, work-planes, ...) still produce a
/// feature carrying their raw fields verbatim (spec.md §4.5.2 "Others" row),
/// so nothing silently disappears from the normalized output.
pub fn normalize_generic(data: &GenericData, ids: &mut IdGenerator) -> Vec<NormalizedFeature> {
    let feature_type = match data.block_type.as_str() {
        "TO" => FeatureType::Thread,
        "KA" => FeatureType::Bend,
        "PR" => FeatureType::Profile,
        "UE" => FeatureType::UnrestrictedContour,
        "BR" => FeatureType::Bevel,
        "VO" => FeatureType::Volume,
        "NU" => FeatureType::NumericControl,
        "FP" => FeatureType::FreeProgram,
        "LP" => FeatureType::LineProgram,
        "RT" => FeatureType::Rotation,
        "WA" => FeatureType::Washing,
        "GR" => FeatureType::Group,
        _ => FeatureType::Variable,
    };
    let apply_only = feature_type == FeatureType::Profile;
    vec![NormalizedFeature {
        id: ids.next(&data.block_type.to_ascii_lowercase()),
        feature_type,
        coordinates: (0.0, 0.0, 0.0),
        face: None,
        parameters: FeatureParameters::Raw { raw_fields: data.raw_fields.clone() },
        metadata: metadata(&data.block_type, (0.0, 0.0, None), feature_type.processing_priority(), apply_only),
        geometry: None,
    }]
}
