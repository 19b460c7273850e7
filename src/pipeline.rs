use crate::config::PipelineConfig;
use crate::crop::{self, CropRecord};
use crate::detector::Detector;
use crate::filter;
use crate::frame_source::FrameSource;
use crate::progress::ProgressSink;
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};

/// Counters accumulated over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub frames_processed: u64,
    pub persons_extracted: u64,
}

/// Result of one run: final counters, every crop written in save order, and
/// whether the loop ended early on a stop request.
#[derive(Debug)]
pub struct RunOutcome {
    pub stats: PipelineStats,
    pub crops: Vec<CropRecord>,
    pub interrupted: bool,
}

/// Drives the frame loop: read, detect, filter, extract, persist.
///
/// `stop` is checked at the top of every iteration, so an in-flight detection
/// or write finishes before the request is honoured and partial results are
/// still returned. A detect call that fails skips that frame and the run
/// continues; a failed crop write is reported and the remaining detections of
/// the frame still go out.
pub fn run(
    config: &PipelineConfig,
    source: &mut dyn FrameSource,
    detector: &mut dyn Detector,
    progress: &mut dyn ProgressSink,
    stop: &AtomicBool,
) -> Result<RunOutcome> {
    let mut stats = PipelineStats::default();
    let mut crops = Vec::new();
    let mut interrupted = false;

    loop {
        if stop.load(Ordering::Relaxed) {
            interrupted = true;
            break;
        }

        let Some(frame) = source.next_frame()? else {
            break;
        };
        stats.frames_processed += 1;

        let detections = match detector.detect(&frame) {
            Ok(detections) => detections,
            Err(e) => {
                // The frame was read; inference failed. Skip it and move on.
                eprintln!("Warning: detection failed on frame {}: {:#}", frame.index, e);
                progress.on_frame(&stats);
                continue;
            }
        };

        let survivors = filter::filter_detections(
            &detections,
            config.target_class_id,
            config.confidence_threshold,
            frame.width() as f32,
            frame.height() as f32,
        );

        for detection in &survivors {
            match crop::save_crop(&frame, detection, &config.output_dir) {
                Ok(Some(record)) => {
                    stats.persons_extracted += 1;
                    progress.on_crop_saved(&record);
                    crops.push(record);
                }
                Ok(None) => {}
                Err(e) => eprintln!("Warning: {:#}", e),
            }
        }

        progress.on_frame(&stats);
    }

    Ok(RunOutcome {
        stats,
        crops,
        interrupted,
    })
}
