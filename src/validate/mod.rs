//! C4 — semantic validator (spec.md §4.4).
//!
//! Three passes over the parsed block list: structural (ST/EN
//! presence/position), per-block (type-specific field checks), and
//! inter-block (IK containment in some AK). Produces a [`ValidationResult`]
//! carrying the surviving blocks, an ordered diagnostic list, and the
//! averaged conformity score (spec.md §3).

mod geometry;
mod per_block;

use crate::config::PipelineConfig;
use crate::model::{BlockType, Diagnostic, ParsedBlock, ParsedBlockData, Severity, ValidationResult};

/// Run the three validation passes over a parsed block list.
pub fn validate(blocks: Vec<ParsedBlock>, config: &PipelineConfig) -> ValidationResult {
    let mut diagnostics = Vec::new();
    structural_pass(&blocks, config, &mut diagnostics);

    let mut valid_blocks = Vec::new();
    let mut block_scores = Vec::new();

    for block in blocks {
        let mut local = block.local_diagnostics.clone();
        let (extra, is_valid) = per_block::validate_block(&block, config);
        local.extend(extra);

        let mut score = 1.0_f64;
        let mut critical = false;
        for d in &local {
            match d.severity {
                Severity::Critical => critical = true,
                _ => score += d.score_delta(),
            }
        }
        let score = if critical { 0.0 } else { score.max(0.0) };
        block_scores.push(score);

        diagnostics.extend(local);
        if is_valid && !critical {
            valid_blocks.push(block);
        }
    }

    inter_block_pass(&valid_blocks, config, &mut diagnostics);

    let conformity_score = if block_scores.is_empty() {
        0.0
    } else {
        block_scores.iter().sum::<f64>() / block_scores.len() as f64
    };

    ValidationResult::new(valid_blocks, diagnostics, conformity_score.clamp(0.0, 1.0))
}

/// Pass 1: ST presence/position, EN presence/position, mandatory-block
/// rules (spec.md §3 invariant 1).
fn structural_pass(blocks: &[ParsedBlock], config: &PipelineConfig, diagnostics: &mut Vec<Diagnostic>) {
    let st_positions: Vec<usize> = blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| b.block_type == BlockType::St)
        .map(|(i, _)| i)
        .collect();

    match st_positions.as_slice() {
        [] => diagnostics.push(Diagnostic::critical("GLOBAL_NO_ST", "no ST block present")),
        [0] => {}
        [first, ..] if *first != 0 => {
            diagnostics.push(Diagnostic::error("GLOBAL_ST_NOT_FIRST", "ST block is not the first block"))
        }
        _ => diagnostics.push(Diagnostic::warning("GLOBAL_MULTIPLE_ST", "more than one ST block present")),
    }

    let en_positions: Vec<usize> = blocks
        .iter()
        .enumerate()
        .filter(|(_, b)| b.block_type == BlockType::En)
        .map(|(i, _)| i)
        .collect();

    match en_positions.as_slice() {
        [] => {
            let severity = if config.strict_mode { Severity::Error } else { Severity::Warning };
            diagnostics.push(Diagnostic::new(
                severity,
                "GLOBAL_NO_EN",
                "no EN block present",
            ));
        }
        [last] if *last == blocks.len() - 1 => {}
        [.., last] if *last != blocks.len() - 1 => {
            let severity = if config.strict_mode { Severity::Error } else { Severity::Warning };
            diagnostics.push(Diagnostic::new(severity, "GLOBAL_EN_NOT_LAST", "EN block is not the last block"));
        }
        _ => {}
    }
}

/// Pass 3: every IK's polygon must be contained in some AK polygon
/// (point-in-polygon on all inner vertices). Non-containment is a Warning
/// in both modes (spec.md §4.4 item 3: "strict mode: Warning recorded but
/// not raised").
fn inter_block_pass(blocks: &[ParsedBlock], _config: &PipelineConfig, diagnostics: &mut Vec<Diagnostic>) {
    let outers: Vec<Vec<(f64, f64)>> = blocks
        .iter()
        .filter(|b| b.block_type == BlockType::Ak)
        .filter_map(|b| match &b.data {
            ParsedBlockData::Ak(c) => Some(c.points.iter().map(|p| (p.x, p.y)).collect()),
            _ => None,
        })
        .collect();

    for block in blocks.iter().filter(|b| b.block_type == BlockType::Ik) {
        let ParsedBlockData::Ik(contour) = &block.data else { continue };
        if contour.points.is_empty() {
            continue;
        }
        let contained = outers
            .iter()
            .any(|outer| contour.points.iter().all(|p| geometry::point_in_polygon((p.x, p.y), outer)));
        if !contained {
            diagnostics.push(Diagnostic::warning(
                "CONT_IK_NOT_CONTAINED",
                format!("inner contour at line {} is not contained in any outer contour", block.span.start_line),
            ));
        }
    }
}

pub use geometry::{point_in_polygon, polygon_is_closed, signed_area};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::parser::parse;

    fn run(src: &str, cfg: &PipelineConfig) -> ValidationResult {
        let lexed = lex(src);
        let parsed = parse(&lexed.tokens, cfg.support_all_blocks);
        validate(parsed.blocks, cfg)
    }

    #[test]
    fn missing_st_is_critical() {
        let cfg = PipelineConfig::default();
        let result = run("EN\n", &cfg);
        assert!(result.diagnostics.iter().any(|d| d.code == "GLOBAL_NO_ST"));
        assert_eq!(result.conformity_score, 0.0);
    }

    #[test]
    fn missing_en_is_warning_in_non_strict_mode() {
        let cfg = PipelineConfig::default();
        let src = "ST\nORD1\nDRW1\n\nM1\nS235\n1\nIPE200\nI\n1000.00\n200.00\n100.00\n5.60\n8.50\n12.00\n";
        let result = run(src, &cfg);
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.code == "GLOBAL_NO_EN" && d.severity == Severity::Warning));
    }

    #[test]
    fn missing_en_is_error_in_strict_mode() {
        let mut cfg = PipelineConfig::default();
        cfg.strict_mode = true;
        let src = "ST\nORD1\nDRW1\n\nM1\nS235\n1\nIPE200\nI\n1000.00\n200.00\n100.00\n5.60\n8.50\n12.00\n";
        let result = run(src, &cfg);
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.code == "GLOBAL_NO_EN" && d.severity == Severity::Error));
    }

    #[test]
    fn zero_diameter_hole_is_critical_and_dropped() {
        let cfg = PipelineConfig::default();
        let src = "ST\nORD1\nDRW1\n\nM1\nS235\n1\nIPE200\nI\n1000.00\n200.00\n100.00\n5.60\n8.50\n12.00\nBO\nv 500.00 100.00 0.00 0.00\nEN\n";
        let result = run(src, &cfg);
        assert!(result.diagnostics.iter().any(|d| d.code == "HOLE_001"));
        assert!(!result.valid_blocks.iter().any(|b| b.block_type == BlockType::Bo));
    }

    #[test]
    fn ik_outside_ak_is_warning_not_error() {
        let cfg = PipelineConfig::default();
        let src = "ST\nORD1\nDRW1\n\nM1\nS235\n1\nIPE200\nI\n1000.00\n200.00\n100.00\n5.60\n8.50\n12.00\n\
AK\nv 0.00 0.00\nv 1000.00 0.00\nv 1000.00 100.00\nv 0.00 100.00\nv 0.00 0.00\n\
IK\nv 2000.00 2000.00\nv 2010.00 2000.00\nv 2010.00 2010.00\nv 2000.00 2010.00\nv 2000.00 2000.00\nEN\n";
        let result = run(src, &cfg);
        assert!(result.diagnostics.iter().any(|d| d.code == "CONT_IK_NOT_CONTAINED"));
        assert!(result.diagnostics.iter().all(|d| d.severity != Severity::Error || d.code != "CONT_IK_NOT_CONTAINED"));
    }
}
