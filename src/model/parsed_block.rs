//! The closed set of DSTV block types and the tagged union of parsed data
//! produced for each, per spec.md §3/§4.3.

use super::diagnostic::Diagnostic;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The closed set of DSTV 7th-edition block-header codes this crate
/// recognizes. `supportAllBlocks = false` restricts acceptance to the basic
/// subset `{ST, EN, BO, AK, IK, SI, SC}` at the parser stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockType {
    St,
    En,
    Bo,
    Ak,
    Ik,
    Si,
    Sc,
    Pu,
    Ko,
    To,
    Ue,
    Pr,
    Ka,
    Br,
    Vo,
    Nu,
    Fp,
    Lp,
    Rt,
    Eb,
    Vb,
    Gr,
    Wa,
    Fb,
    Bf,
    Kl,
    Kn,
    Ro,
    WorkPlane(u8),
    In,
}

impl BlockType {
    /// Parse a two-letter DSTV header code, if it belongs to the closed set.
    pub fn from_header(code: &str) -> Option<Self> {
        use BlockType::*;
        let upper = code.to_ascii_uppercase();
        Some(match upper.as_str() {
            "ST" => St,
            "EN" => En,
            "BO" => Bo,
            "AK" => Ak,
            "IK" => Ik,
            "SI" => Si,
            "SC" => Sc,
            "PU" => Pu,
            "KO" => Ko,
            "TO" => To,
            "UE" => Ue,
            "PR" => Pr,
            "KA" => Ka,
            "BR" => Br,
            "VO" => Vo,
            "NU" => Nu,
            "FP" => Fp,
            "LP" => Lp,
            "RT" => Rt,
            "EB" => Eb,
            "VB" => Vb,
            "GR" => Gr,
            "WA" => Wa,
            "FB" => Fb,
            "BF" => Bf,
            "KL" => Kl,
            "KN" => Kn,
            "RO" => Ro,
            "IN" => In,
            _ if upper.starts_with('E') && upper.len() == 2 => {
                let digit = upper.as_bytes()[1];
                if digit.is_ascii_digit() {
                    WorkPlane(digit - b'0')
                } else {
                    return None;
                }
            }
            _ => return None,
        })
    }

    pub fn code(&self) -> String {
        use BlockType::*;
        match self {
            St => "ST".into(),
            En => "EN".into(),
            Bo => "BO".into(),
            Ak => "AK".into(),
            Ik => "IK".into(),
            Si => "SI".into(),
            Sc => "SC".into(),
            Pu => "PU".into(),
            Ko => "KO".into(),
            To => "TO".into(),
            Ue => "UE".into(),
            Pr => "PR".into(),
            Ka => "KA".into(),
            Br => "BR".into(),
            Vo => "VO".into(),
            Nu => "NU".into(),
            Fp => "FP".into(),
            Lp => "LP".into(),
            Rt => "RT".into(),
            Eb => "EB".into(),
            Vb => "VB".into(),
            Gr => "GR".into(),
            Wa => "WA".into(),
            Fb => "FB".into(),
            Bf => "BF".into(),
            Kl => "KL".into(),
            Kn => "KN".into(),
            Ro => "RO".into(),
            WorkPlane(n) => format!("E{n}"),
            In => "IN".into(),
        }
    }

    /// The reduced block set accepted when `supportAllBlocks = false`.
    pub fn is_basic(&self) -> bool {
        matches!(
            self,
            BlockType::St
                | BlockType::En
                | BlockType::Bo
                | BlockType::Ak
                | BlockType::Ik
                | BlockType::Si
                | BlockType::Sc
        )
    }
}

/// DSTV face-code prefix, shared across BO/SI/AK/IK point records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaceCode {
    V,
    U,
    O,
    H,
}

impl FaceCode {
    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'v' => Some(FaceCode::V),
            'u' => Some(FaceCode::U),
            'o' => Some(FaceCode::O),
            'h' => Some(FaceCode::H),
            _ => None,
        }
    }
}

/// One-letter DSTV profile-type code from the ST block, per spec.md §4.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileTypeCode {
    I,
    U,
    L,
    T,
    Z,
    M,
    R,
    P,
    B,
    C,
}

impl ProfileTypeCode {
    /// Accepted while reassembling the ST profile-name field (spec.md §4.3:
    /// `{I, U, L, T, M, R, P, B, C}`). `Z` is accepted too even though the
    /// spec's parser table omits it, because the normalizer's mapping table
    /// (§4.5.1) names `Z ↦ ZProfile` — see DESIGN.md.
    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'I' => Some(ProfileTypeCode::I),
            'U' => Some(ProfileTypeCode::U),
            'L' => Some(ProfileTypeCode::L),
            'T' => Some(ProfileTypeCode::T),
            'Z' => Some(ProfileTypeCode::Z),
            'M' => Some(ProfileTypeCode::M),
            'R' => Some(ProfileTypeCode::R),
            'P' => Some(ProfileTypeCode::P),
            'B' => Some(ProfileTypeCode::B),
            'C' => Some(ProfileTypeCode::C),
            _ => None,
        }
    }
}

/// A point in a contour/marking/cut record: DSTV face-local coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RawPoint {
    pub face: Option<FaceCode>,
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

/// ST — piece header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StData {
    pub order_number: String,
    pub drawing_number: String,
    pub phase_number: String,
    pub piece_number: String,
    pub steel_grade: String,
    pub quantity: i64,
    pub profile_name: String,
    pub profile_type_code: Option<ProfileTypeCode>,
    /// Geometric fields in DSTV field order (field 8 onward), kept raw
    /// because their meaning is profile-type-dependent (spec.md §4.3); the
    /// normalizer interprets them via `ProfileTypeCode`.
    pub geometric_fields: Vec<f64>,
}

/// One hole record within a BO block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoleRecord {
    pub face: Option<FaceCode>,
    pub x: f64,
    pub y: f64,
    pub diameter: f64,
    pub depth: f64,
    pub angle: Option<f64>,
    pub plane: Option<String>,
    pub tolerance: Option<f64>,
}

/// BO — holes (one or more per block).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoData {
    pub holes: Vec<HoleRecord>,
}

/// AK/IK — outer/inner contour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContourData {
    pub points: Vec<RawPoint>,
    pub closed: bool,
}

/// SI — marking/text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiData {
    pub face: Option<FaceCode>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub text_height: f64,
    /// Optional rotation angle in degrees, present on some DSTV mills'
    /// SI records between textHeight and the text itself; absent from the
    /// basic §4.3 field layout, so most inputs carry `None` here.
    pub angle: Option<f64>,
    pub text: String,
    /// Set when the lexer's whitespace splitting made the text
    /// reconstruction heuristic (see spec.md §9 Open Question 1).
    pub text_reconstruction_uncertain: bool,
}

/// SC — rectangular cut.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScData {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub angle: Option<f64>,
    pub radius: Option<f64>,
    pub plane: Option<String>,
}

/// PU — punch mark.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuData {
    pub x: f64,
    pub y: f64,
    pub depth: Option<f64>,
    pub diameter: Option<f64>,
    pub plane: Option<String>,
}

/// KO — contour marking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KoData {
    pub points: Vec<RawPoint>,
}

/// EN — end marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnData {
    pub processing_time: Option<f64>,
    pub checksum: Option<String>,
}

/// Fallback record for block types whose field layout this crate does not
/// interpret (spec.md §4.3: "Unimplemented parsers fall back to a generic
/// record"). The raw fields are preserved verbatim for round-trip fidelity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericData {
    pub block_type: String,
    pub raw_fields: Vec<String>,
    pub parsed: bool,
}

/// Block-type-specific parsed payload, a closed tagged union per spec.md §9
/// "Tagged-variant discipline".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ParsedBlockData {
    St(StData),
    En(EnData),
    Bo(BoData),
    Ak(ContourData),
    Ik(ContourData),
    Si(SiData),
    Sc(ScData),
    Pu(PuData),
    Ko(KoData),
    Generic(GenericData),
}

/// Source span of a parsed block within the token stream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BlockSpan {
    pub start_token_idx: usize,
    pub end_token_idx: usize,
    pub start_line: usize,
}

/// A fully parsed DSTV block, ready for validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedBlock {
    pub block_type: BlockType,
    pub data: ParsedBlockData,
    pub raw_fields: Vec<String>,
    pub span: BlockSpan,
    pub local_diagnostics: Vec<Diagnostic>,
}

impl ParsedBlock {
    pub fn type_code(&self) -> String {
        self.block_type.code()
    }
}

/// Opaque string-keyed map used for the pipeline context's shared-data slot
/// (spec.md §9 "Shared-context state"). Keys are namespaced
/// (`"dstv.<component>.<name>"`) to avoid collisions.
pub type SharedData = HashMap<String, serde_json::Value>;
