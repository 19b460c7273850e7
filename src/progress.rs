use crate::crop::CropRecord;
use crate::frame_source::SourceMetadata;
use crate::pipeline::PipelineStats;
use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::time::Instant;

/// Observability hook for the frame loop. The orchestrator stays pure; how
/// progress is surfaced is up to the sink.
pub trait ProgressSink {
    /// Called once per processed frame with the running counters.
    fn on_frame(&mut self, stats: &PipelineStats);

    /// Called once per crop written to disk.
    fn on_crop_saved(&mut self, record: &CropRecord);
}

/// Sink that renders an indicatif progress bar on the console.
pub struct ConsoleProgress {
    tracker: VideoProgressTracker,
}

impl ConsoleProgress {
    pub fn new(metadata: &SourceMetadata) -> Self {
        let tracker = if metadata.total_frames > 0 {
            VideoProgressTracker::new(metadata.total_frames, metadata.fps, "person extraction")
        } else {
            VideoProgressTracker::new_unknown_total(metadata.fps, "person extraction")
        };
        Self { tracker }
    }

    pub fn finish(&self) {
        self.tracker.finish();
    }
}

impl ProgressSink for ConsoleProgress {
    fn on_frame(&mut self, stats: &PipelineStats) {
        self.tracker.update_frame(stats.persons_extracted);
    }

    fn on_crop_saved(&mut self, record: &CropRecord) {
        debug_println(format_args!("saved {}", record.filepath.display()));
    }
}

/// Sink that reports nothing. For tests and embedding.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn on_frame(&mut self, _stats: &PipelineStats) {}

    fn on_crop_saved(&mut self, _record: &CropRecord) {}
}

/// Progress tracker for the frame loop
pub struct VideoProgressTracker {
    progress_bar: ProgressBar,
    start_time: Instant,
    frame_rate: f64,
    processed_frames: u64,
}

impl VideoProgressTracker {
    /// Creates a new progress tracker with known total frames
    pub fn new(total_frames: u64, frame_rate: f64, operation_name: &str) -> Self {
        let progress_bar = ProgressBar::new(total_frames);

        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames ({percent}%) | {msg}")
            .unwrap()
            .progress_chars("#>-");

        progress_bar.set_style(style);
        progress_bar.set_message(format!("Processing {}", operation_name));

        Self {
            progress_bar,
            start_time: Instant::now(),
            frame_rate,
            processed_frames: 0,
        }
    }

    /// Creates a new progress tracker without known total frames
    pub fn new_unknown_total(frame_rate: f64, operation_name: &str) -> Self {
        let progress_bar = ProgressBar::new_spinner();

        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {pos} frames | {msg}")
            .unwrap();

        progress_bar.set_style(style);
        progress_bar.set_message(format!("Processing {}", operation_name));

        Self {
            progress_bar,
            start_time: Instant::now(),
            frame_rate,
            processed_frames: 0,
        }
    }

    /// Advances the bar by one frame and refreshes the status message
    pub fn update_frame(&mut self, persons_extracted: u64) {
        self.processed_frames += 1;
        self.progress_bar.inc(1);

        let elapsed = self.start_time.elapsed();
        let speed = self.processed_frames as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
        self.progress_bar.set_message(format!(
            "{} | persons: {} | Speed: {:.1} fps",
            self.current_video_time(),
            persons_extracted,
            speed
        ));
    }

    /// Finishes the progress bar
    pub fn finish(&self) {
        let total_time = self.start_time.elapsed();
        let avg_fps = self.processed_frames as f64 / total_time.as_secs_f64().max(f64::EPSILON);
        self.progress_bar.finish_with_message(format!(
            "Completed! Processed: {} | Avg FPS: {:.1}",
            format_duration(total_time.as_secs_f64()),
            avg_fps
        ));
    }

    /// Current position in the video as h:mm:ss, derived from the frame rate
    fn current_video_time(&self) -> String {
        if self.frame_rate > 0.0 {
            format_duration(self.processed_frames as f64 / self.frame_rate)
        } else {
            format!("{} frames", self.processed_frames)
        }
    }

    pub fn processed_frames(&self) -> u64 {
        self.processed_frames
    }
}

/// Formats a duration in seconds to h:mm:ss format
fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Helper function to check if debug logging is enabled
pub fn is_debug_enabled() -> bool {
    env::var("RUST_LOG")
        .map(|val| val.to_lowercase() == "debug")
        .unwrap_or(false)
}

/// Debug print function that only prints when RUST_LOG=debug
pub fn debug_println(args: std::fmt::Arguments) {
    if is_debug_enabled() {
        println!("{}", args);
    }
}
