use anyhow::{Context, Result, bail};
use personcrop::cli::Args;
use personcrop::config::PipelineConfig;
use personcrop::detector::YoloDetector;
use personcrop::frame_source::{FrameSource, VideoSource};
use personcrop::pipeline;
use personcrop::progress::ConsoleProgress;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Args = argh::from_env();
    let config = PipelineConfig::from_args(&args);

    println!("Stage 1: person detection and extraction");

    // The missing-input case is a precondition failure, checked before any
    // output directory entry is created.
    if !config.video_path.is_file() {
        bail!(
            "input video not found at {} (place your video there or pass --video)",
            config.video_path.display()
        );
    }

    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.output_dir.display()
        )
    })?;
    println!("Output directory: {}", config.output_dir.display());

    let mut detector = YoloDetector::load(&args)?;
    let mut source = VideoSource::open(&config.video_path)?;

    let metadata = source.metadata();
    println!(
        "Video info: {} frames, {:.2} fps, {:.2}s",
        metadata.total_frames, metadata.fps, metadata.duration_secs
    );

    // Ctrl-C flips the stop flag; the loop honours it at the next iteration
    // boundary and still reports partial results.
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                stop.store(true, Ordering::Relaxed);
            }
        });
    }

    let mut progress = ConsoleProgress::new(&metadata);
    let outcome = pipeline::run(
        &config,
        &mut source,
        &mut detector,
        &mut progress,
        stop.as_ref(),
    )?;
    progress.finish();

    if outcome.interrupted {
        println!("Processing interrupted; reporting partial results");
    }
    println!("Frames processed: {}", outcome.stats.frames_processed);
    println!("Persons extracted: {}", outcome.stats.persons_extracted);
    println!("Crops saved to: {}", config.output_dir.display());

    Ok(())
}
