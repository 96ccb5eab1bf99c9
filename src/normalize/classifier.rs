//! §4.5.3 — the AK contour classifier, the most delicate logic in the
//! normalizer. Classifies a single outer-contour point list into one of
//! seven kinds using geometric heuristics over the profile it belongs to.

use crate::model::{FaceCode, ProfileDimensions, ProfileType};
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

const EXTREMITY_MARGIN_MM: f64 = 10.0;
const END_CUT_SEARCH_WINDOW_MM: f64 = 100.0;
const DIAGONAL_MIN_DELTA_MM: f64 = 10.0;
const BASE_SHAPE_TOLERANCE_MM: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndCutSide {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutKind {
    Straight,
    Angle,
}

/// Outcome of classifying one AK contour (spec.md §4.5.3 items 1-7).
#[derive(Debug, Clone)]
pub enum AkOutcome {
    /// Rectangle matches the profile's own (length, width) footprint on
    /// Web/Bottom: the extrusion itself implies it, so nothing is emitted.
    ProfileBaseShape,
    /// A tube end-cut, deduplicated across sister AK blocks on other faces
    /// via [`TubeEndCutTracker`].
    TubeEndCut {
        side: EndCutSide,
        chamfer_length: f64,
        angle_degrees: f64,
    },
    /// A tube cut that isn't an end-cut: either a 5-point closed rectangle
    /// (`Straight`) or a diagonal segment elsewhere on the piece (`Angle`).
    Cut { kind: CutKind },
    /// I-profile (or flange-face) full-length 9-point contour: merged with
    /// sibling AK blocks into one feature by the caller.
    CutWithNotches,
    /// Short contour confined to either extremity.
    Notch,
    /// Default: none of the above patterns matched.
    PlainContour,
}

/// Process-global dedup state for tube end-cuts (spec.md §4.5.3, §5
/// "shared resources"): keyed by `(profile type, profile length)` so the
/// same physical end-cut, seen again on a sister AK block on a different
/// face, isn't emitted twice. Access is serialized by the `Mutex`; this is
/// the only shared mutable state in the whole pipeline.
pub struct TubeEndCutTracker {
    seen: OnceLock<Mutex<HashMap<(u8, u64), (bool, bool)>>>,
}

impl TubeEndCutTracker {
    pub const fn new() -> Self {
        TubeEndCutTracker { seen: OnceLock::new() }
    }

    fn map(&self) -> &Mutex<HashMap<(u8, u64), (bool, bool)>> {
        self.seen.get_or_init(|| Mutex::new(HashMap::new()))
    }

    fn key(profile_type: ProfileType, length: f64) -> (u8, u64) {
        (profile_type as u8, length.to_bits())
    }

    /// Returns `true` the first time this `(profile_type, length, side)` is
    /// claimed; `false` on every subsequent call, so the caller skips
    /// re-emitting the same end-cut for a sister AK block on another face.
    pub fn claim(&self, profile_type: ProfileType, length: f64, side: EndCutSide) -> bool {
        let mut guard = self.map().lock().expect("tube end-cut tracker poisoned");
        let entry = guard.entry(Self::key(profile_type, length)).or_insert((false, false));
        let already = match side {
            EndCutSide::Start => entry.0,
            EndCutSide::End => entry.1,
        };
        match side {
            EndCutSide::Start => entry.0 = true,
            EndCutSide::End => entry.1 = true,
        }
        !already
    }
}

impl Default for TubeEndCutTracker {
    fn default() -> Self {
        Self::new()
    }
}

fn is_tube(profile_type: ProfileType) -> bool {
    matches!(profile_type, ProfileType::TubeRect | ProfileType::TubeRound | ProfileType::Pipe)
}

/// Classify a single AK contour. `points` excludes the closing repeat of
/// the first point if present (callers pass the raw parsed list either
/// way; only consecutive-pair deltas matter here).
pub fn classify(
    points: &[(f64, f64)],
    face: Option<FaceCode>,
    profile_type: ProfileType,
    dimensions: &ProfileDimensions,
    tracker: &TubeEndCutTracker,
) -> AkOutcome {
    let length = dimensions.length;
    let width = dimensions.get("width").unwrap_or(0.0);

    if points.len() < 3 {
        return AkOutcome::PlainContour;
    }

    let min_x = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let max_x = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);

    if is_tube(profile_type) && face == Some(FaceCode::V) {
        if let Some(outcome) = classify_tube_web(points, length, min_x, max_x, profile_type, tracker) {
            return outcome;
        }
    }

    if !is_tube(profile_type) && matches!(face, Some(FaceCode::V) | Some(FaceCode::U)) && is_base_footprint(min_x, max_x, points, length, width)
    {
        return AkOutcome::ProfileBaseShape;
    }

    let is_full_length = (min_x - 0.0).abs() <= EXTREMITY_MARGIN_MM && (max_x - length).abs() <= EXTREMITY_MARGIN_MM;
    if points.len() == 9 && is_full_length {
        return AkOutcome::CutWithNotches;
    }

    if min_x > EXTREMITY_MARGIN_MM || max_x < length - EXTREMITY_MARGIN_MM {
        return AkOutcome::Notch;
    }

    AkOutcome::PlainContour
}

fn is_base_footprint(min_x: f64, max_x: f64, points: &[(f64, f64)], length: f64, width: f64) -> bool {
    let min_y = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let max_y = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    points.len() <= 5
        && (min_x - 0.0).abs() <= BASE_SHAPE_TOLERANCE_MM
        && (max_x - length).abs() <= BASE_SHAPE_TOLERANCE_MM
        && (min_y - 0.0).abs() <= BASE_SHAPE_TOLERANCE_MM
        && (max_y - width).abs() <= BASE_SHAPE_TOLERANCE_MM
}

/// A "diagonal segment": a consecutive pair of points whose X and Y deltas
/// both exceed [`DIAGONAL_MIN_DELTA_MM`] (spec.md §4.5.3 item 1/2).
fn find_diagonal_near(points: &[(f64, f64)], window: impl Fn(f64) -> bool) -> Option<(f64, f64)> {
    for pair in points.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        let dx = x1 - x0;
        let dy = y1 - y0;
        if dx.abs() > DIAGONAL_MIN_DELTA_MM && dy.abs() > DIAGONAL_MIN_DELTA_MM && (window(x0) || window(x1)) {
            return Some((dx, dy));
        }
    }
    None
}

fn is_closed_rectangle(points: &[(f64, f64)]) -> bool {
    if points.len() != 5 {
        return false;
    }
    let xs: Vec<f64> = points[..4].iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points[..4].iter().map(|p| p.1).collect();
    let distinct_x = xs.iter().fold(Vec::<f64>::new(), |mut acc, v| {
        if !acc.iter().any(|a: &f64| (a - v).abs() < 1e-6) {
            acc.push(*v);
        }
        acc
    });
    let distinct_y = ys.iter().fold(Vec::<f64>::new(), |mut acc, v| {
        if !acc.iter().any(|a: &f64| (a - v).abs() < 1e-6) {
            acc.push(*v);
        }
        acc
    });
    distinct_x.len() == 2 && distinct_y.len() == 2
}

fn classify_tube_web(
    points: &[(f64, f64)],
    length: f64,
    min_x: f64,
    max_x: f64,
    profile_type: ProfileType,
    tracker: &TubeEndCutTracker,
) -> Option<AkOutcome> {
    let first_significant_x = points
        .iter()
        .map(|p| p.0)
        .filter(|x| *x > EXTREMITY_MARGIN_MM)
        .fold(f64::INFINITY, f64::min);
    let last_significant_x = points
        .iter()
        .map(|p| p.0)
        .filter(|x| *x < length - EXTREMITY_MARGIN_MM)
        .fold(f64::NEG_INFINITY, f64::max);

    if first_significant_x.is_finite() && first_significant_x > EXTREMITY_MARGIN_MM {
        if let Some((dx, dy)) = find_diagonal_near(points, |x| x < END_CUT_SEARCH_WINDOW_MM) {
            if tracker.claim(profile_type, length, EndCutSide::Start) {
                let angle = dx.abs().atan2(dy.abs()).to_degrees();
                return Some(AkOutcome::TubeEndCut {
                    side: EndCutSide::Start,
                    chamfer_length: first_significant_x,
                    angle_degrees: angle,
                });
            }
            return Some(AkOutcome::PlainContour);
        }
    }

    if last_significant_x.is_finite() && last_significant_x < length - EXTREMITY_MARGIN_MM {
        if let Some((dx, dy)) = find_diagonal_near(points, |x| x > length - END_CUT_SEARCH_WINDOW_MM) {
            if tracker.claim(profile_type, length, EndCutSide::End) {
                let angle = dx.abs().atan2(dy.abs()).to_degrees();
                return Some(AkOutcome::TubeEndCut {
                    side: EndCutSide::End,
                    chamfer_length: length - last_significant_x,
                    angle_degrees: angle,
                });
            }
            return Some(AkOutcome::PlainContour);
        }
    }

    if find_diagonal_near(points, |_| true).is_some() {
        return Some(AkOutcome::Cut { kind: CutKind::Angle });
    }

    if points.len() == 5 && is_closed_rectangle(points) {
        return Some(AkOutcome::Cut { kind: CutKind::Straight });
    }

    if (min_x - 0.0).abs() <= EXTREMITY_MARGIN_MM && (max_x - length).abs() <= EXTREMITY_MARGIN_MM {
        return Some(AkOutcome::ProfileBaseShape);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;

    fn dims(length: f64, width: f64) -> ProfileDimensions {
        let mut cs = Map::new();
        cs.insert("width".to_string(), width);
        ProfileDimensions { length, cross_section: cs }
    }

    #[test]
    fn base_shape_rectangle_matching_footprint() {
        let pts = vec![(0.0, 0.0), (1000.0, 0.0), (1000.0, 100.0), (0.0, 100.0), (0.0, 0.0)];
        let tracker = TubeEndCutTracker::new();
        let outcome = classify(&pts, Some(FaceCode::V), ProfileType::IProfile, &dims(1000.0, 100.0), &tracker);
        assert!(matches!(outcome, AkOutcome::ProfileBaseShape));
    }

    #[test]
    fn straight_end_cut_tube() {
        let pts = vec![(0.0, 0.0), (2259.98, 0.0), (2259.98, 50.8), (0.0, 50.8), (0.0, 0.0)];
        let tracker = TubeEndCutTracker::new();
        let outcome = classify(&pts, Some(FaceCode::V), ProfileType::TubeRect, &dims(2259.98, 50.8), &tracker);
        assert!(matches!(outcome, AkOutcome::Cut { kind: CutKind::Straight } | AkOutcome::ProfileBaseShape));
    }

    #[test]
    fn angle_end_cut_near_start_with_tracker_dedup() {
        let pts = vec![(0.0, 50.8), (28.39, 0.0), (500.0, 0.0), (500.0, 50.8), (0.0, 50.8)];
        let tracker = TubeEndCutTracker::new();
        let first = classify(&pts, Some(FaceCode::V), ProfileType::TubeRect, &dims(2259.98, 50.8), &tracker);
        match first {
            AkOutcome::TubeEndCut { side, chamfer_length, .. } => {
                assert_eq!(side, EndCutSide::Start);
                assert!((chamfer_length - 28.39).abs() < 1e-6);
            }
            other => panic!("expected TubeEndCut start, got {other:?}"),
        }
        // Sister AK block on face 'o' with the same shape must not
        // re-claim the same end.
        let second = classify(&pts, Some(FaceCode::V), ProfileType::TubeRect, &dims(2259.98, 50.8), &tracker);
        assert!(matches!(second, AkOutcome::PlainContour));
    }

    #[test]
    fn notch_at_extremity() {
        let pts = vec![(950.0, 0.0), (1000.0, 0.0), (1000.0, 20.0), (950.0, 20.0), (950.0, 0.0)];
        let tracker = TubeEndCutTracker::new();
        let outcome = classify(&pts, Some(FaceCode::V), ProfileType::IProfile, &dims(1000.0, 100.0), &tracker);
        assert!(matches!(outcome, AkOutcome::Notch));
    }

    #[test]
    fn classification_is_deterministic_for_same_inputs() {
        let pts = vec![(950.0, 0.0), (1000.0, 0.0), (1000.0, 20.0), (950.0, 20.0), (950.0, 0.0)];
        let tracker = TubeEndCutTracker::new();
        let a = classify(&pts, Some(FaceCode::V), ProfileType::IProfile, &dims(1000.0, 100.0), &tracker);
        let tracker2 = TubeEndCutTracker::new();
        let b = classify(&pts, Some(FaceCode::V), ProfileType::IProfile, &dims(1000.0, 100.0), &tracker2);
        assert!(matches!((a, b), (AkOutcome::Notch, AkOutcome::Notch)));
    }
}
