use crate::filter::FilteredDetection;
use crate::frame_source::Frame;
use anyhow::{Context, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};

/// File extension for saved crops.
const CROP_EXT: &str = "jpg";

/// Record of one crop written to disk. Never mutated after creation; a run
/// produces one record per saved file, in save order.
#[derive(Debug, Clone)]
pub struct CropRecord {
    pub frame_index: u64,
    pub person_index: usize,
    pub confidence: f32,
    pub filepath: PathBuf,
}

/// Builds the output file name for one detection:
/// `frame_<index, 6 digits>_person_<n>_conf_<confidence, 2 decimals>.jpg`.
///
/// The (frame_index, person_index) pair is the uniqueness key within a run;
/// the confidence is decorative.
pub fn crop_filename(frame_index: u64, person_index: usize, confidence: f32) -> String {
    format!(
        "frame_{:06}_person_{}_conf_{:.2}.{}",
        frame_index, person_index, confidence, CROP_EXT
    )
}

/// Slices the detection's clamped bounding box out of the frame.
///
/// Returns `None` when the region is empty. The filter already drops
/// degenerate boxes; this re-check guards the disk write against boxes that
/// collapse when converted to whole pixels.
pub fn extract_crop(frame: &Frame, detection: &FilteredDetection) -> Option<RgbImage> {
    let x = detection.bbox.x1 as u32;
    let y = detection.bbox.y1 as u32;
    let width = (detection.bbox.x2 as u32).saturating_sub(x);
    let height = (detection.bbox.y2 as u32).saturating_sub(y);

    if width == 0 || height == 0 {
        return None;
    }

    Some(image::imageops::crop_imm(&frame.pixels, x, y, width, height).to_image())
}

/// Extracts one region and writes it under `output_dir`, returning its
/// record. `Ok(None)` means the region was empty and nothing was written.
pub fn save_crop(
    frame: &Frame,
    detection: &FilteredDetection,
    output_dir: &Path,
) -> Result<Option<CropRecord>> {
    let Some(region) = extract_crop(frame, detection) else {
        return Ok(None);
    };

    let filepath = output_dir.join(crop_filename(
        frame.index,
        detection.person_index,
        detection.confidence,
    ));
    region
        .save(&filepath)
        .with_context(|| format!("failed to write crop {}", filepath.display()))?;

    Ok(Some(CropRecord {
        frame_index: frame.index,
        person_index: detection.person_index,
        confidence: detection.confidence,
        filepath,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::BBox;
    use std::fs;

    fn test_frame(index: u64, width: u32, height: u32) -> Frame {
        let mut pixels = RgbImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                pixels.put_pixel(x, y, image::Rgb([x as u8, y as u8, 128]));
            }
        }
        Frame { index, pixels }
    }

    fn filtered(person_index: usize, confidence: f32, bbox: BBox) -> FilteredDetection {
        FilteredDetection {
            person_index,
            confidence,
            bbox,
        }
    }

    #[test]
    fn test_filename_format() {
        assert_eq!(
            crop_filename(1, 1, 0.8),
            "frame_000001_person_1_conf_0.80.jpg"
        );
        assert_eq!(
            crop_filename(12345, 3, 0.987),
            "frame_012345_person_3_conf_0.99.jpg"
        );
    }

    #[test]
    fn test_filenames_differ_by_person_index() {
        // Same frame, same rounded confidence: the sequence index keeps the
        // names unique.
        let a = crop_filename(7, 1, 0.75);
        let b = crop_filename(7, 2, 0.75);
        assert_ne!(a, b);
    }

    #[test]
    fn test_extract_matches_clamped_box() {
        let frame = test_frame(1, 100, 200);
        let detection = filtered(1, 0.9, BBox::new(0.0, 10.0, 30.0, 200.0));
        let region = extract_crop(&frame, &detection).unwrap();
        assert_eq!(region.width(), 30);
        assert_eq!(region.height(), 190);
        // Top-left pixel of the region comes from (0, 10) in the frame.
        assert_eq!(region.get_pixel(0, 0), &image::Rgb([0, 10, 128]));
    }

    #[test]
    fn test_subpixel_box_yields_no_region() {
        let frame = test_frame(1, 100, 100);
        let detection = filtered(1, 0.9, BBox::new(4.2, 10.0, 4.9, 60.0));
        assert!(extract_crop(&frame, &detection).is_none());
    }

    #[test]
    fn test_save_crop_writes_file_and_record() {
        let dir = std::env::temp_dir().join(format!("personcrop_save_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let frame = test_frame(3, 64, 64);
        let detection = filtered(2, 0.66, BBox::new(8.0, 8.0, 40.0, 56.0));
        let record = save_crop(&frame, &detection, &dir).unwrap().unwrap();

        assert_eq!(record.frame_index, 3);
        assert_eq!(record.person_index, 2);
        assert_eq!(
            record.filepath.file_name().unwrap().to_str().unwrap(),
            "frame_000003_person_2_conf_0.66.jpg"
        );
        assert!(record.filepath.is_file());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_save_crop_skips_empty_region() {
        let dir = std::env::temp_dir().join(format!("personcrop_empty_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let frame = test_frame(1, 64, 64);
        let detection = filtered(1, 0.9, BBox::new(10.0, 10.2, 10.9, 20.0));
        assert!(save_crop(&frame, &detection, &dir).unwrap().is_none());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);

        fs::remove_dir_all(&dir).unwrap();
    }
}
