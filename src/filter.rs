use crate::detector::{BBox, Detection};

/// A detection that survived class, confidence, and geometry filtering.
///
/// `person_index` is 1-based within its frame and drives output file naming,
/// so the numbering must be deterministic for a given detector output.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredDetection {
    pub person_index: usize,
    pub confidence: f32,
    pub bbox: BBox,
}

/// Narrows raw detections down to usable target-class instances.
///
/// Policy, in order: discard class mismatches, discard detections whose
/// confidence does not strictly exceed the threshold, clamp the box into the
/// frame, discard boxes the clamp collapsed. Survivors keep detector order
/// and are numbered 1..=n.
pub fn filter_detections(
    detections: &[Detection],
    target_class_id: usize,
    confidence_threshold: f32,
    frame_width: f32,
    frame_height: f32,
) -> Vec<FilteredDetection> {
    let mut survivors = Vec::new();

    for detection in detections {
        if detection.class_id != target_class_id {
            continue;
        }
        // Strictly above: a detection sitting exactly on the threshold drops.
        if detection.confidence <= confidence_threshold {
            continue;
        }

        let clamped = clamp_bbox(&detection.bbox, frame_width, frame_height);
        // A box lying mostly outside the frame can collapse to zero area.
        if clamped.x1 >= clamped.x2 || clamped.y1 >= clamped.y2 {
            continue;
        }

        survivors.push(FilteredDetection {
            person_index: survivors.len() + 1,
            confidence: detection.confidence,
            bbox: clamped,
        });
    }

    survivors
}

fn clamp_bbox(bbox: &BBox, frame_width: f32, frame_height: f32) -> BBox {
    BBox::new(
        bbox.x1.clamp(0.0, frame_width),
        bbox.y1.clamp(0.0, frame_height),
        bbox.x2.clamp(0.0, frame_width),
        bbox.y2.clamp(0.0, frame_height),
    )
}
