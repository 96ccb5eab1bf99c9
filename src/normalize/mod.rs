//! C5 — normalizer (spec.md §4.5), the hard heart of the system: validated
//! blocks → one [`NormalizedProfile`] with an ordered, neutral-frame
//! feature list. Delegates coordinate/face math to [`crate::coordinate`]
//! and AK classification to [`classifier`].

pub mod classifier;
mod features;
mod profile_extraction;
pub mod ordering;

use crate::config::PipelineConfig;
use crate::errors::StageError;
use crate::model::{
    BlockType, Diagnostic, FaceCode, FeatureParameters, FeatureType, NeutralFace, NormalizedFeature,
    NormalizedProfile, ParsedBlock, ParsedBlockData, ProfileDimensions, ProfileType, ValidationResult,
};
use classifier::{AkOutcome, CutKind as ClassifierCutKind, EndCutSide, TubeEndCutTracker};

/// Generates the `"dstv_<type>_<counter>"` feature ids spec.md §3 requires
/// to be unique within a profile.
pub struct IdGenerator {
    prefix: String,
    counter: u64,
}

impl IdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        IdGenerator { prefix: prefix.into(), counter: 0 }
    }

    pub fn next(&mut self, type_tag: &str) -> String {
        self.counter += 1;
        format!("{}_{}_{}", self.prefix, type_tag, self.counter)
    }
}

pub(crate) struct FeatureCtx<'a> {
    pub(crate) profile_type: ProfileType,
    pub(crate) dimensions: &'a ProfileDimensions,
}

/// Run C5 over a [`ValidationResult`], producing the single normalized
/// profile for this file plus any diagnostics raised during normalization
/// itself (distinct from the diagnostics already carried on `validation`).
pub fn normalize(
    validation: &ValidationResult,
    config: &PipelineConfig,
) -> Result<(NormalizedProfile, Vec<Diagnostic>), StageError> {
    let mut diagnostics = Vec::new();

    let st_block = validation
        .valid_blocks
        .iter()
        .find(|b| b.block_type == BlockType::St)
        .ok_or_else(StageError::no_st_block)?;

    let ParsedBlockData::St(st) = &st_block.data else {
        return Err(StageError::internal("ST block carries non-ST data"));
    };

    let profile_type = st
        .profile_type_code
        .map(profile_extraction::profile_type_from_code)
        .unwrap_or_else(|| profile_extraction::profile_type_from_name(&st.profile_name));
    let dimensions = profile_extraction::dimensions_for(profile_type, &st.geometric_fields);
    let material = profile_extraction::material_for_grade(&st.steel_grade);
    let provenance = profile_extraction::provenance_from(st);

    let ctx = FeatureCtx { profile_type, dimensions: &dimensions };
    let mut ids = IdGenerator::new(config.feature_id_prefix.clone());

    let mut all_features = Vec::new();
    all_features.extend(normalize_ak_blocks(&validation.valid_blocks, &ctx, &mut ids, &mut diagnostics));

    for block in &validation.valid_blocks {
        let produced = match &block.data {
            ParsedBlockData::St(_) | ParsedBlockData::En(_) | ParsedBlockData::Ak(_) => Vec::new(),
            ParsedBlockData::Bo(d) => features::normalize_bo(d, &ctx, &mut ids, &mut diagnostics),
            ParsedBlockData::Ik(d) => features::normalize_ik(&d.points, dominant_face(&d.points), &ctx, &mut ids),
            ParsedBlockData::Si(d) => features::normalize_si(d, &ctx, &mut ids),
            ParsedBlockData::Sc(d) => features::normalize_sc(d, &ctx, &mut ids),
            ParsedBlockData::Pu(d) => features::normalize_pu(d, &mut ids),
            ParsedBlockData::Ko(d) => features::normalize_ko(d, &mut ids),
            ParsedBlockData::Generic(d) => features::normalize_generic(d, &mut ids),
        };
        all_features.extend(produced);
    }

    let features = ordering::order_features(all_features);

    let display_name = if st.piece_number.trim().is_empty() {
        st.profile_name.clone()
    } else {
        st.piece_number.clone()
    };

    let profile = NormalizedProfile {
        id: format!("{}_{}", provenance.piece_number, provenance.order_number),
        display_name,
        profile_type,
        material,
        dimensions,
        features,
        provenance,
    };

    Ok((profile, diagnostics))
}

fn dominant_face(points: &[crate::model::RawPoint]) -> Option<FaceCode> {
    points.iter().find_map(|p| p.face)
}

/// AK blocks need their own pass: each is individually classified
/// (spec.md §4.5.3), then a merge heuristic folds multi-block
/// notch/cut-with-notches complexes into a single `CutWithNotches` feature
/// (spec.md §4.5.3 "When multiple AK blocks with combined complexity...").
fn normalize_ak_blocks(
    blocks: &[ParsedBlock],
    ctx: &FeatureCtx,
    ids: &mut IdGenerator,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<NormalizedFeature> {
    let tracker = TubeEndCutTracker::new();
    let ak_blocks: Vec<&ParsedBlock> = blocks.iter().filter(|b| b.block_type == BlockType::Ak).collect();

    struct Classified<'b> {
        block: &'b ParsedBlock,
        face: Option<FaceCode>,
        points: Vec<(f64, f64)>,
        outcome: AkOutcome,
    }

    let classified: Vec<Classified> = ak_blocks
        .iter()
        .filter_map(|block| {
            let ParsedBlockData::Ak(contour) = &block.data else { return None };
            let face = contour.points.first().and_then(|p| p.face);
            let points: Vec<(f64, f64)> = contour.points.iter().map(|p| (p.x, p.y)).collect();
            let outcome = classifier::classify(&points, face, ctx.profile_type, ctx.dimensions, &tracker);
            Some(Classified { block, face, points, outcome })
        })
        .collect();

    let complex_indices: Vec<usize> = classified
        .iter()
        .enumerate()
        .filter(|(_, c)| matches!(c.outcome, AkOutcome::CutWithNotches | AkOutcome::Notch))
        .map(|(i, _)| i)
        .collect();

    let has_multiple_faces = classified.iter().map(|c| c.face).collect::<std::collections::HashSet<_>>().len() > 1;
    let merge = complex_indices.len() > 1 && (classified.len() > 1 || has_multiple_faces);

    let mut features = Vec::new();
    let mut skip = vec![false; classified.len()];

    if merge {
        let primary_idx = complex_indices
            .iter()
            .copied()
            .max_by_key(|&i| (classified[i].face == Some(FaceCode::V), classified[i].points.len()))
            .expect("complex_indices non-empty");
        for &i in &complex_indices {
            skip[i] = true;
        }
        let primary = &classified[primary_idx];
        let points = primary
            .points
            .iter()
            .map(|p| crate::model::FeaturePoint { x: p.0, y: p.1, z: 0.0 })
            .collect();
        let (position, face) = convert_anchor(primary.points.first().copied(), primary.face, ctx);
        features.push(NormalizedFeature {
            id: ids.next("cutwithnotches"),
            feature_type: FeatureType::CutWithNotches,
            coordinates: position,
            face,
            parameters: FeatureParameters::CutWithNotches { points },
            metadata: crate::model::FeatureMetadata {
                original_block_type: "AK".to_string(),
                original_dstv_coords: primary.points.first().map(|p| (p.0, p.1, None)).unwrap_or((0.0, 0.0, None)),
                work_plane: None,
                processing_priority: FeatureType::CutWithNotches.processing_priority(),
                apply_only: false,
                detected_as: vec!["merged-multi-block".to_string()],
            },
            geometry: None,
        });
    }

    for (i, c) in classified.iter().enumerate() {
        if skip[i] {
            continue;
        }
        match &c.outcome {
            AkOutcome::ProfileBaseShape => {}
            AkOutcome::TubeEndCut { side, chamfer_length, angle_degrees } => {
                let x = match side {
                    EndCutSide::Start => -ctx.dimensions.length / 2.0,
                    EndCutSide::End => ctx.dimensions.length / 2.0,
                };
                features.push(NormalizedFeature {
                    id: ids.next("endcut"),
                    feature_type: FeatureType::EndCut,
                    coordinates: (x, 0.0, 0.0),
                    face: Some(NeutralFace::Front),
                    parameters: FeatureParameters::EndCut {
                        chamfer_length: *chamfer_length,
                        angle: *angle_degrees,
                        position: match side {
                            EndCutSide::Start => crate::model::EndCutPosition::Start,
                            EndCutSide::End => crate::model::EndCutPosition::End,
                        },
                    },
                    metadata: crate::model::FeatureMetadata {
                        original_block_type: "AK".to_string(),
                        original_dstv_coords: c.points.first().map(|p| (p.0, p.1, None)).unwrap_or((0.0, 0.0, None)),
                        work_plane: None,
                        processing_priority: FeatureType::EndCut.processing_priority(),
                        apply_only: false,
                        detected_as: vec!["tube-end-cut".to_string()],
                    },
                    geometry: None,
                });
            }
            AkOutcome::Cut { kind } => {
                let (position, face) = convert_anchor(c.points.first().copied(), c.face, ctx);
                features.push(NormalizedFeature {
                    id: ids.next("cut"),
                    feature_type: FeatureType::Cut,
                    coordinates: position,
                    face,
                    parameters: FeatureParameters::Cut {
                        cut_type: match kind {
                            ClassifierCutKind::Straight => crate::model::CutKind::Straight,
                            ClassifierCutKind::Angle => crate::model::CutKind::Angle,
                        },
                        width: None,
                        height: None,
                        angle: None,
                    },
                    metadata: crate::model::FeatureMetadata {
                        original_block_type: "AK".to_string(),
                        original_dstv_coords: c.points.first().map(|p| (p.0, p.1, None)).unwrap_or((0.0, 0.0, None)),
                        work_plane: None,
                        processing_priority: FeatureType::Cut.processing_priority(),
                        apply_only: false,
                        detected_as: vec!["tube-cut".to_string()],
                    },
                    geometry: None,
                });
            }
            AkOutcome::CutWithNotches => {
                let points = c.points.iter().map(|p| crate::model::FeaturePoint { x: p.0, y: p.1, z: 0.0 }).collect();
                let (position, face) = convert_anchor(c.points.first().copied(), c.face, ctx);
                features.push(NormalizedFeature {
                    id: ids.next("cutwithnotches"),
                    feature_type: FeatureType::CutWithNotches,
                    coordinates: position,
                    face,
                    parameters: FeatureParameters::CutWithNotches { points },
                    metadata: crate::model::FeatureMetadata {
                        original_block_type: "AK".to_string(),
                        original_dstv_coords: c.points.first().map(|p| (p.0, p.1, None)).unwrap_or((0.0, 0.0, None)),
                        work_plane: None,
                        processing_priority: FeatureType::CutWithNotches.processing_priority(),
                        apply_only: false,
                        detected_as: Vec::new(),
                    },
                    geometry: None,
                });
            }
            AkOutcome::Notch => {
                let points = c.points.iter().map(|p| crate::model::FeaturePoint { x: p.0, y: p.1, z: 0.0 }).collect();
                let (position, face) = convert_anchor(c.points.first().copied(), c.face, ctx);
                features.push(NormalizedFeature {
                    id: ids.next("notch"),
                    feature_type: FeatureType::Notch,
                    coordinates: position,
                    face,
                    parameters: FeatureParameters::Notch { points },
                    metadata: crate::model::FeatureMetadata {
                        original_block_type: "AK".to_string(),
                        original_dstv_coords: c.points.first().map(|p| (p.0, p.1, None)).unwrap_or((0.0, 0.0, None)),
                        work_plane: None,
                        processing_priority: FeatureType::Notch.processing_priority(),
                        apply_only: false,
                        detected_as: Vec::new(),
                    },
                    geometry: None,
                });
            }
            AkOutcome::PlainContour => {
                let points = c.points.iter().map(|p| crate::model::FeaturePoint { x: p.0, y: p.1, z: 0.0 }).collect();
                let orientation_warning = crate::validate::signed_area(&c.points) <= 0.0;
                let (position, face) = convert_anchor(c.points.first().copied(), c.face, ctx);
                features.push(NormalizedFeature {
                    id: ids.next("contour"),
                    feature_type: FeatureType::Contour,
                    coordinates: position,
                    face,
                    parameters: FeatureParameters::Contour {
                        points,
                        closed: c.block.local_diagnostics.is_empty(),
                        orientation_warning,
                    },
                    metadata: crate::model::FeatureMetadata {
                        original_block_type: "AK".to_string(),
                        original_dstv_coords: c.points.first().map(|p| (p.0, p.1, None)).unwrap_or((0.0, 0.0, None)),
                        work_plane: None,
                        processing_priority: FeatureType::Contour.processing_priority(),
                        apply_only: false,
                        detected_as: Vec::new(),
                    },
                    geometry: None,
                });
            }
        }
    }

    let _ = diagnostics;
    features
}

fn convert_anchor(point: Option<(f64, f64)>, face: Option<FaceCode>, ctx: &FeatureCtx) -> ((f64, f64, f64), Option<NeutralFace>) {
    let (x, y) = point.unwrap_or((0.0, 0.0));
    let conv_ctx = crate::coordinate::ConversionContext {
        profile_type: ctx.profile_type,
        dimensions: ctx.dimensions,
        face,
        feature_type: crate::coordinate::FeatureKind::Contour,
    };
    let converted = crate::coordinate::convert_position((x, y, None), &conv_ctx);
    (converted.position, converted.face)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::lexer::lex;
    use crate::parser::parse;
    use crate::validate::validate;

    fn run(src: &str) -> (NormalizedProfile, Vec<Diagnostic>) {
        let cfg = PipelineConfig::default();
        let lexed = lex(src);
        let parsed = parse(&lexed.tokens, cfg.support_all_blocks);
        let validation = validate(parsed.blocks, &cfg);
        normalize(&validation, &cfg).expect("normalize should succeed")
    }

    #[test]
    fn s1_single_through_hole_on_ipe200_web() {
        let src = "ST\nORD1\nDRW1\n\nM1\nS235\n1\nIPE200\nI\n1000.00\n200.00\n100.00\n5.60\n8.50\n12.00\n\
BO\nv 500.00u 100.00 22.00 0.00\nEN\n";
        let (profile, _diag) = run(src);
        assert_eq!(profile.profile_type as u8, ProfileType::IProfile as u8);
        assert_eq!(profile.dimensions.length, 1000.0);
        let holes: Vec<&NormalizedFeature> = profile.features.iter().filter(|f| f.feature_type == FeatureType::Hole).collect();
        assert_eq!(holes.len(), 1);
        match &holes[0].parameters {
            FeatureParameters::Hole { diameter, depth, .. } => {
                assert_eq!(*diameter, 22.0);
                assert_eq!(*depth, 0.0);
            }
            other => panic!("expected Hole parameters, got {other:?}"),
        }
        assert!((holes[0].coordinates.0 - 0.0).abs() < 1e-9);
    }

    #[test]
    fn s2_outer_contour_matching_footprint_emits_nothing() {
        let src = "ST\nORD1\nDRW1\n\nM1\nS235\n1\nIPE200\nI\n1000.00\n100.00\n100.00\n5.60\n8.50\n12.00\n\
AK\nv 0.00 0.00\nv 1000.00 0.00\nv 1000.00 100.00\nv 0.00 100.00\nv 0.00 0.00\nEN\n";
        let (profile, _diag) = run(src);
        assert!(!profile.features.iter().any(|f| f.feature_type == FeatureType::Contour));
    }

    #[test]
    fn feature_ids_are_unique() {
        let src = "ST\nORD1\nDRW1\n\nM1\nS235\n1\nIPE200\nI\n1000.00\n200.00\n100.00\n5.60\n8.50\n12.00\n\
BO\nv 100.00 50.00 10.00 0.00\nu 200.00 50.00 12.00 0.00\nEN\n";
        let (profile, _diag) = run(src);
        let mut ids: Vec<&str> = profile.features.iter().map(|f| f.id.as_str()).collect();
        let before = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[test]
    fn features_are_sorted_by_processing_priority() {
        let src = "ST\nORD1\nDRW1\n\nM1\nS235\n1\nIPE200\nI\n1000.00\n200.00\n100.00\n5.60\n8.50\n12.00\n\
BO\nv 100.00 50.00 10.00 0.00\nEN\nSI\nv 2.00 2.00 0.00 10.00 M1\nEN\n";
        let (profile, _diag) = run(src);
        let mut last = 0u8;
        for f in &profile.features {
            assert!(f.metadata.processing_priority >= last);
            last = f.metadata.processing_priority;
        }
    }

    #[test]
    fn missing_st_block_is_a_hard_failure() {
        let cfg = PipelineConfig::default();
        let lexed = lex("EN\n");
        let parsed = parse(&lexed.tokens, cfg.support_all_blocks);
        let validation = validate(parsed.blocks, &cfg);
        assert!(normalize(&validation, &cfg).is_err());
    }
}
