use crate::cli::Args;
use crate::config;
use crate::frame_source::Frame;
use anyhow::Result;
use usls::{Image, Model, NAMES_COCO_80, Runtime, models::YOLO};

/// Axis-aligned bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }
}

/// One raw detection as reported by the model, before any filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub class_id: usize,
    pub confidence: f32,
    pub bbox: BBox,
}

/// Object detection over a single frame.
///
/// Implementations may be stateful (model weights loaded once) but each call
/// depends only on the frame passed in. Detections span every class the
/// model recognizes; narrowing to the target class is the filter's job.
pub trait Detector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>>;
}

/// YOLO-backed detector over the COCO label space.
pub struct YoloDetector {
    model: Runtime<YOLO>,
}

impl YoloDetector {
    /// Loads the model once, up front. Inference failures after this point
    /// are per-frame errors.
    pub fn load(args: &Args) -> Result<Self> {
        println!(
            "Loading YOLO model (scale: {}, device: {})...",
            args.scale, args.device
        );
        let model = YOLO::new(config::build_model_config(args)?.commit()?)?;
        println!("Model loaded");
        Ok(Self { model })
    }
}

impl Detector for YoloDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Detection>> {
        let image = Image::from(frame.pixels.clone());
        let ys = self.model.forward(&[image])?;

        let mut detections = Vec::new();
        for y in &ys {
            let Some(hbbs) = y.hbbs() else {
                continue;
            };
            for hbb in hbbs {
                // Resolve the class id from the model's label table. A box
                // the model reports without a usable label cannot be
                // classified and is skipped.
                let Some(class_id) = hbb.name().and_then(class_id_for_label) else {
                    continue;
                };
                detections.push(Detection {
                    class_id,
                    confidence: hbb.confidence().unwrap_or(0.0),
                    bbox: BBox::new(hbb.xmin(), hbb.ymin(), hbb.xmax(), hbb.ymax()),
                });
            }
        }

        Ok(detections)
    }
}

fn class_id_for_label(label: &str) -> Option<usize> {
    NAMES_COCO_80.iter().position(|name| *name == label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_label_resolves_to_class_zero() {
        assert_eq!(class_id_for_label("person"), Some(config::PERSON_CLASS_ID));
    }

    #[test]
    fn test_unknown_label_has_no_class() {
        assert_eq!(class_id_for_label("minotaur"), None);
    }

    #[test]
    fn test_bbox_dimensions() {
        let bbox = BBox::new(10.0, 20.0, 50.0, 100.0);
        assert_eq!(bbox.width(), 40.0);
        assert_eq!(bbox.height(), 80.0);
    }
}
