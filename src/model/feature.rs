//! Normalizer output types: [`NormalizedFeature`] and its closed parameter
//! and face vocabularies (spec.md §3).

use serde::{Deserialize, Serialize};

/// Neutral, profile-agnostic face tag produced by the coordinate service
/// (C6), replacing the DSTV face-code/profile-type pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NeutralFace {
    Web,
    TopFlange,
    BottomFlange,
    Front,
    Back,
    Top,
    Bottom,
}

/// The closed set of normalized feature kinds (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureType {
    Hole,
    Cut,
    EndCut,
    Contour,
    Notch,
    CutWithNotches,
    Marking,
    Punch,
    WeldPrep,
    Thread,
    Bend,
    Profile,
    UnrestrictedContour,
    Bevel,
    Volume,
    NumericControl,
    FreeProgram,
    LineProgram,
    Rotation,
    Washing,
    Group,
    Variable,
}

impl FeatureType {
    /// Default ordering key by originating block type, spec.md §4.7: `PR=0 <
    /// AK=1 < IK=2 < SC=3 < BO=4 < SI=5 < PU=6 < KO=7 < others=8`. The
    /// contour family (AK and IK both normalize to the same `FeatureType`
    /// variants) can't be disambiguated from the type alone, so this gives
    /// the AK value; the normalizer overrides `FeatureMetadata.processing_priority`
    /// to 2 for any contour feature built from an IK block. `NormalizedFeature`
    /// ordering (C7) always sorts on the metadata field, never this method
    /// directly, so that override is authoritative.
    pub fn processing_priority(self) -> u8 {
        match self {
            FeatureType::Profile => 0,
            FeatureType::Contour
            | FeatureType::CutWithNotches
            | FeatureType::Notch
            | FeatureType::UnrestrictedContour
            | FeatureType::EndCut => 1,
            FeatureType::Cut => 3,
            FeatureType::Hole => 4,
            FeatureType::Marking => 5,
            FeatureType::Punch => 6,
            FeatureType::WeldPrep
            | FeatureType::Thread
            | FeatureType::Bend
            | FeatureType::Bevel
            | FeatureType::Volume
            | FeatureType::NumericControl
            | FeatureType::FreeProgram
            | FeatureType::LineProgram
            | FeatureType::Rotation
            | FeatureType::Washing
            | FeatureType::Group
            | FeatureType::Variable => 8,
        }
    }
}

/// A 2D polygon point used by contour-carrying features, in the same
/// coordinate frame as the feature's own `coordinates`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeaturePoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// The tube end-cut position, relative to piece length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndCutPosition {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutKind {
    Straight,
    Angle,
}

/// Type-specific parameter payload for a [`NormalizedFeature`], a closed
/// tagged union per spec.md §9 "Tagged-variant discipline".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum FeatureParameters {
    Hole {
        diameter: f64,
        depth: f64,
        angle: Option<f64>,
    },
    Cut {
        cut_type: CutKind,
        width: Option<f64>,
        height: Option<f64>,
        angle: Option<f64>,
    },
    EndCut {
        chamfer_length: f64,
        angle: f64,
        position: EndCutPosition,
    },
    Contour {
        points: Vec<FeaturePoint>,
        closed: bool,
        orientation_warning: bool,
    },
    Notch {
        points: Vec<FeaturePoint>,
    },
    CutWithNotches {
        points: Vec<FeaturePoint>,
    },
    Marking {
        text: String,
        text_height: f64,
        angle: Option<f64>,
        web_thickness: Option<f64>,
        flange_thickness: Option<f64>,
    },
    Punch {
        diameter: Option<f64>,
        depth: Option<f64>,
    },
    WeldPrep {
        angle: Option<f64>,
    },
    Thread {
        diameter: Option<f64>,
        depth: Option<f64>,
    },
    Bend {
        angle: Option<f64>,
        radius: Option<f64>,
    },
    Profile,
    UnrestrictedContour {
        points: Vec<FeaturePoint>,
    },
    Bevel {
        angle: Option<f64>,
    },
    Raw {
        raw_fields: Vec<String>,
    },
}

/// Ambient metadata attached to every [`NormalizedFeature`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureMetadata {
    pub original_block_type: String,
    pub original_dstv_coords: (f64, f64, Option<f64>),
    pub work_plane: Option<String>,
    pub processing_priority: u8,
    pub apply_only: bool,
    pub detected_as: Vec<String>,
}

/// A single normalized, machine-agnostic feature, in the neutral frame
/// (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedFeature {
    pub id: String,
    pub feature_type: FeatureType,
    pub coordinates: (f64, f64, f64),
    pub face: Option<NeutralFace>,
    pub parameters: FeatureParameters,
    pub metadata: FeatureMetadata,
    pub geometry: Option<FeatureGeometry>,
}

/// Optional derived geometry summary (axis-aligned bounds, area, perimeter).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureGeometry {
    pub bounds_min: (f64, f64),
    pub bounds_max: (f64, f64),
    pub area: Option<f64>,
    pub perimeter: Option<f64>,
}
