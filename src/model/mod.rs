//! Closed data model shared by every pipeline stage (spec.md §3).
//!
//! Tagged-variant discipline (`types.rs`, `geometry/ir/node.rs`): every
//! entity that varies by kind is a Rust `enum`, never a dynamically-typed
//! map.

mod diagnostic;
mod feature;
mod parsed_block;
mod profile;
mod token;
mod validation;

pub use diagnostic::{BlockRef, Diagnostic, Severity};
pub use feature::{
    CutKind, EndCutPosition, FeatureGeometry, FeatureMetadata, FeaturePoint, FeatureParameters,
    FeatureType, NeutralFace, NormalizedFeature,
};
pub use parsed_block::{
    BlockSpan, BlockType, BoData, ContourData, EnData, FaceCode, GenericData, HoleRecord, KoData,
    ParsedBlock, ParsedBlockData, ProfileTypeCode, PuData, RawPoint, ScData, SharedData, SiData,
    StData,
};
pub use profile::{MaterialProperties, NormalizedProfile, ProfileDimensions, ProfileType, Provenance};
pub use token::{Token, TokenKind};
pub use validation::ValidationResult;
