use anyhow::{Context, Result};
use ffmpeg_next as ffmpeg;
use ffmpeg_next::{codec, format, frame, media, software::scaling};
use image::RgbImage;
use std::path::Path;

/// One decoded video frame, identified by a 1-based index.
///
/// A frame is owned by the loop iteration that reads it and is not retained
/// afterwards.
pub struct Frame {
    pub index: u64,
    pub pixels: RgbImage,
}

impl Frame {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Best-effort container metadata. `total_frames` and `fps` come from the
/// container header and may be zero or wrong; the frame loop stops on the
/// first failed read, never on these numbers.
#[derive(Debug, Clone, Copy)]
pub struct SourceMetadata {
    pub total_frames: u64,
    pub fps: f64,
    pub duration_secs: f64,
}

/// Sequential frame producer. Abstracts the decode library away from the
/// orchestrator so scripted sources can stand in during tests.
pub trait FrameSource {
    fn metadata(&self) -> SourceMetadata;

    /// Returns the next frame, or `None` at end of stream. Frames arrive in
    /// strictly increasing index order starting at 1; once `None` has been
    /// returned the source stays exhausted.
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// FFmpeg-backed frame source.
///
/// Owns the demux and decode contexts; both are released when the value is
/// dropped, on success, error, and interruption paths alike.
pub struct VideoSource {
    ictx: format::context::Input,
    decoder: ffmpeg::decoder::Video,
    scaler: scaling::Context,
    stream_index: usize,
    metadata: SourceMetadata,
    width: u32,
    height: u32,
    next_index: u64,
    eof_sent: bool,
    finished: bool,
}

impl VideoSource {
    /// Opens `path` for decoding. Fails if the container cannot be opened or
    /// holds no video stream.
    pub fn open(path: &Path) -> Result<Self> {
        ffmpeg::init().context("failed to initialise FFmpeg")?;

        let ictx = format::input(&path)
            .with_context(|| format!("could not open video {}", path.display()))?;

        let (stream_index, parameters, metadata) = {
            let stream = ictx
                .streams()
                .best(media::Type::Video)
                .context("no video stream found in input")?;
            (stream.index(), stream.parameters(), read_metadata(&stream))
        };

        let decoder = codec::context::Context::from_parameters(parameters)
            .context("failed to build decoder context")?
            .decoder()
            .video()
            .context("failed to open video decoder")?;

        let width = decoder.width();
        let height = decoder.height();

        let scaler = scaling::Context::get(
            decoder.format(),
            width,
            height,
            format::Pixel::RGB24,
            width,
            height,
            scaling::Flags::BILINEAR,
        )
        .context("failed to create to-RGB scaler")?;

        Ok(Self {
            ictx,
            decoder,
            scaler,
            stream_index,
            metadata,
            width,
            height,
            next_index: 0,
            eof_sent: false,
            finished: false,
        })
    }

    fn to_rgb_frame(&mut self, decoded: &frame::Video, index: u64) -> Result<Frame> {
        let mut rgb = frame::Video::empty();
        self.scaler
            .run(decoded, &mut rgb)
            .context("to-RGB scaling failed")?;

        // Compact to a plain buffer; the scaler may pad rows with stride bytes.
        let stride = rgb.stride(0);
        let raw = rgb.data(0);
        let row_len = self.width as usize * 3;
        let mut data = Vec::with_capacity(row_len * self.height as usize);
        for row in 0..self.height as usize {
            let start = row * stride;
            data.extend_from_slice(&raw[start..start + row_len]);
        }

        let pixels = RgbImage::from_raw(self.width, self.height, data)
            .context("decoded frame has unexpected dimensions")?;

        Ok(Frame { index, pixels })
    }
}

impl FrameSource for VideoSource {
    fn metadata(&self) -> SourceMetadata {
        self.metadata
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.finished {
            return Ok(None);
        }

        let mut decoded = frame::Video::empty();
        loop {
            // Drain any frame the decoder already holds.
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                self.next_index += 1;
                let index = self.next_index;
                return Ok(Some(self.to_rgb_frame(&decoded, index)?));
            }

            if self.eof_sent {
                self.finished = true;
                return Ok(None);
            }

            let packet = {
                let mut next = None;
                for (stream, packet) in self.ictx.packets() {
                    if stream.index() == self.stream_index {
                        next = Some(packet);
                        break;
                    }
                }
                next
            };

            match packet {
                Some(packet) => {
                    // A packet the decoder rejects ends the stream the same
                    // way a failed read does.
                    if self.decoder.send_packet(&packet).is_err() {
                        let _ = self.decoder.send_eof();
                        self.eof_sent = true;
                    }
                }
                None => {
                    let _ = self.decoder.send_eof();
                    self.eof_sent = true;
                }
            }
        }
    }
}

fn read_metadata(stream: &ffmpeg::Stream) -> SourceMetadata {
    let fps = rational_to_f64(stream.avg_frame_rate());

    let time_base = stream.time_base();
    let duration_secs = if stream.duration() > 0 && time_base.denominator() > 0 {
        stream.duration() as f64 * time_base.numerator() as f64 / time_base.denominator() as f64
    } else {
        0.0
    };

    SourceMetadata {
        total_frames: estimate_total_frames(stream.frames(), duration_secs, fps),
        fps,
        duration_secs,
    }
}

fn rational_to_f64(r: ffmpeg::Rational) -> f64 {
    if r.denominator() == 0 {
        0.0
    } else {
        r.numerator() as f64 / r.denominator() as f64
    }
}

/// nb_frames is set by most muxers; fall back to a duration x fps estimate
/// when it is missing.
fn estimate_total_frames(header_frames: i64, duration_secs: f64, fps: f64) -> u64 {
    if header_frames > 0 {
        return header_frames as u64;
    }
    if duration_secs > 0.0 && fps > 0.0 {
        return (duration_secs * fps).round() as u64;
    }
    0
}
