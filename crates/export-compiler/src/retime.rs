//! Speed-change (retime) pipeline.
//!
//! Frame interpolation runs before time remapping so the remap never
//! drops freshly synthesized frames. Audio tempo is corrected with
//! atempo, whose per-stage range is [0.5, 2.0]; factors outside that
//! range are decomposed into a chain of in-range stages. A fixed
//! limiter and volume trim guard against clipping introduced by the
//! tempo stages.

use std::path::Path;

use vertcut_common::{VertcutError, VertcutResult};

use crate::compile::{RenderGraph, RenderInput};
use crate::graph::{Filter, FilterGraph};

const ATEMPO_MIN: f64 = 0.5;
const ATEMPO_MAX: f64 = 2.0;

/// Parameters for a retime job.
#[derive(Debug, Clone, Copy)]
pub struct RetimeParams {
    /// Target output frame rate.
    pub fps: u32,

    /// Speed factor (> 0). 2.0 plays twice as fast.
    pub speed: f64,
}

/// Decompose a tempo factor into atempo-supported stages.
pub fn atempo_stages(factor: f64) -> Vec<f64> {
    let mut stages = Vec::new();
    let mut remaining = factor;
    while remaining > ATEMPO_MAX {
        stages.push(ATEMPO_MAX);
        remaining /= ATEMPO_MAX;
    }
    while remaining < ATEMPO_MIN {
        stages.push(ATEMPO_MIN);
        remaining /= ATEMPO_MIN;
    }
    stages.push(remaining);
    stages
}

/// Compile a single-input speed-change graph.
///
/// `source_duration_secs` feeds progress reporting; the output is
/// expected to run `duration / speed` seconds. Sources without an
/// audio stream get synthesized silence so the output always carries
/// an audio track.
pub fn compile_retime(
    input: &Path,
    params: &RetimeParams,
    source_duration_secs: Option<f64>,
    has_audio: bool,
) -> VertcutResult<RenderGraph> {
    if !params.speed.is_finite() || params.speed <= 0.0 {
        return Err(VertcutError::validation(format!(
            "speed factor must be positive, got {}",
            params.speed
        )));
    }
    if params.fps == 0 {
        return Err(VertcutError::validation("target fps must be positive"));
    }

    let mut graph = FilterGraph::new();

    // Interpolate up to fps * speed first, then remap timestamps down to
    // the target rate.
    graph.chain(
        vec!["0:v".to_string()],
        vec![
            Filter::new("minterpolate")
                .arg("fps", params.fps as f64 * params.speed)
                .arg("mi_mode", "mci"),
            Filter::new("setpts").pos(format!("PTS/{}", params.speed)),
        ],
        vec!["vout".to_string()],
    );

    let expected = source_duration_secs
        .map(|d| d / params.speed)
        .unwrap_or(0.0);

    if has_audio {
        let mut audio_filters: Vec<Filter> = atempo_stages(params.speed)
            .into_iter()
            .map(|stage| Filter::new("atempo").pos(stage))
            .collect();
        audio_filters.push(Filter::new("alimiter").arg("limit", 0.95));
        audio_filters.push(Filter::new("volume").pos(0.9));

        graph.chain(
            vec!["0:a".to_string()],
            audio_filters,
            vec!["aout".to_string()],
        );
    } else {
        // No audio stream to retime; the trim bounds the generated
        // silence to the remapped video length.
        graph.chain(
            vec![],
            vec![
                Filter::new("anullsrc").arg("r", 48000u32).arg("cl", "stereo"),
                Filter::new("atrim").arg("duration", expected),
            ],
            vec!["aout".to_string()],
        );
    }

    Ok(RenderGraph {
        inputs: vec![RenderInput {
            path: input.to_path_buf(),
            loop_still: false,
            limit_secs: None,
        }],
        filter_complex: graph.serialize(),
        video_out: "vout".to_string(),
        audio_out: "aout".to_string(),
        expected_duration_secs: expected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn product(stages: &[f64]) -> f64 {
        stages.iter().product()
    }

    #[test]
    fn in_range_factor_is_single_stage() {
        assert_eq!(atempo_stages(1.5), vec![1.5]);
        assert_eq!(atempo_stages(2.0), vec![2.0]);
        assert_eq!(atempo_stages(0.5), vec![0.5]);
    }

    #[test]
    fn fast_factor_chains_double_stages() {
        let stages = atempo_stages(4.0);
        assert_eq!(stages, vec![2.0, 2.0]);
        assert!((product(&stages) - 4.0).abs() < 1e-9);

        let stages = atempo_stages(5.0);
        assert!(stages.iter().all(|s| (ATEMPO_MIN..=ATEMPO_MAX).contains(s)));
        assert!((product(&stages) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn slow_factor_chains_half_stages() {
        let stages = atempo_stages(0.2);
        assert!(stages.iter().all(|s| (ATEMPO_MIN..=ATEMPO_MAX).contains(s)));
        assert!((product(&stages) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn interpolation_precedes_remap() {
        let graph = compile_retime(
            &PathBuf::from("/tmp/in.mp4"),
            &RetimeParams {
                fps: 30,
                speed: 2.0,
            },
            Some(10.0),
            true,
        )
        .unwrap();

        let minterpolate = graph.filter_complex.find("minterpolate").unwrap();
        let setpts = graph.filter_complex.find("setpts").unwrap();
        assert!(minterpolate < setpts);
        assert!(graph
            .filter_complex
            .contains("minterpolate=fps=60:mi_mode=mci"));
        assert!(graph.filter_complex.contains("setpts=PTS/2"));
        assert!((graph.expected_duration_secs - 5.0).abs() < 1e-9);
    }

    #[test]
    fn audio_chain_ends_with_limiter_and_trim() {
        let graph = compile_retime(
            &PathBuf::from("/tmp/in.mp4"),
            &RetimeParams {
                fps: 30,
                speed: 4.0,
            },
            None,
            true,
        )
        .unwrap();
        assert!(graph
            .filter_complex
            .contains("atempo=2,atempo=2,alimiter=limit=0.95,volume=0.9"));
    }

    #[test]
    fn silent_source_gets_synthesized_audio() {
        let graph = compile_retime(
            &PathBuf::from("/tmp/screencap.mp4"),
            &RetimeParams {
                fps: 30,
                speed: 2.0,
            },
            Some(10.0),
            false,
        )
        .unwrap();

        assert!(!graph.filter_complex.contains("0:a"));
        assert!(!graph.filter_complex.contains("atempo"));
        assert!(graph
            .filter_complex
            .contains("anullsrc=r=48000:cl=stereo,atrim=duration=5[aout]"));
        assert_eq!(graph.audio_out, "aout");
    }

    #[test]
    fn non_positive_speed_is_rejected() {
        let params = RetimeParams {
            fps: 30,
            speed: 0.0,
        };
        assert!(compile_retime(&PathBuf::from("/tmp/in.mp4"), &params, None, true).is_err());
    }
}
