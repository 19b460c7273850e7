use crate::cli::Args;
use anyhow::Result;
use std::path::PathBuf;
use usls::{Config, NAMES_COCO_80};

/// COCO class id for "person".
pub const PERSON_CLASS_ID: usize = 0;

/// A detection must strictly exceed this confidence to be kept.
pub const CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Model-level confidence floor. Kept well below [`CONFIDENCE_THRESHOLD`] so
/// the detection filter, not the model, decides what survives.
const MODEL_CLASS_CONFS: [f32; 1] = [0.25];

/// Resolved pipeline configuration, built once from command line arguments
/// and passed into the orchestrator.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub video_path: PathBuf,
    pub output_dir: PathBuf,
    pub target_class_id: usize,
    pub confidence_threshold: f32,
}

impl PipelineConfig {
    pub fn from_args(args: &Args) -> Self {
        Self {
            video_path: PathBuf::from(&args.video),
            output_dir: PathBuf::from(&args.output),
            target_class_id: PERSON_CLASS_ID,
            confidence_threshold: CONFIDENCE_THRESHOLD,
        }
    }
}

/// Builds a YOLO model configuration from command line arguments
pub fn build_model_config(args: &Args) -> Result<Config> {
    let config = Config::yolo()
        .with_version(args.ver.try_into()?)
        .with_scale(args.scale.parse()?)
        .with_model_dtype(args.dtype.parse()?)
        .with_model_device(args.device.parse()?)
        .with_class_confs(&MODEL_CLASS_CONFS)
        .with_class_names(&NAMES_COCO_80);

    Ok(config)
}
