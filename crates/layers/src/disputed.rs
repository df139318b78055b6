use compute::nearest_point_on_line;
use formats::{DisputedCollection, DisputedLine};
use scene::Projection;
use serde::{Deserialize, Serialize};

/// Camera scale at which the disputed-border overlay becomes visible.
pub const OVERLAY_MIN_SCALE: f64 = 3.0;
/// Vertical gap between a line's centroid and its label anchor (planar
/// units).
const LABEL_OFFSET: f64 = 10.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelSide {
    Top,
    Bottom,
}

/// Data-driven label→side table. New labeled lines get a placement by
/// adding a row here, not by touching layout code.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnnotationSides {
    pairs: Vec<(String, LabelSide)>,
}

impl AnnotationSides {
    pub fn new(pairs: Vec<(String, LabelSide)>) -> Self {
        Self { pairs }
    }

    pub fn insert(&mut self, label: impl Into<String>, side: LabelSide) {
        self.pairs.push((label.into(), side));
    }

    pub fn side_for(&self, label: &str) -> Option<LabelSide> {
        self.pairs
            .iter()
            .find(|(key, _)| key == label)
            .map(|(_, side)| *side)
    }
}

/// Measured size of a rendered label, supplied by the external drawing
/// surface. Leader lines cannot be laid out before labels have been
/// rendered and measured.
pub trait LabelMetrics {
    fn measure(&self, label: &str) -> [f64; 2];
}

/// Per-line overlay record, rebuilt on every show. Loaded source features
/// are never written to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisputedAnnotation {
    pub line_index: usize,
    pub label: String,
    pub centroid: [f64; 2],
    pub label_position: [f64; 2],
    pub side: Option<LabelSide>,
    /// Leader segment from the label box edge to the border. Anchoring at
    /// the border point nearest the centroid keeps the segment clear of
    /// the border run it annotates.
    pub leader: Option<[[f64; 2]; 2]>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DisputedSnapshot {
    pub paths: Vec<Vec<[f64; 2]>>,
    pub annotations: Vec<DisputedAnnotation>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisputedLayer {
    pub sides: AnnotationSides,
    visible: bool,
}

impl DisputedLayer {
    pub fn new(sides: AnnotationSides) -> Self {
        Self {
            sides,
            visible: false,
        }
    }

    /// Syncs visibility with the camera scale. Returns `true` when the
    /// overlay toggled; showing while shown or hiding while hidden is a
    /// no-op.
    pub fn update_visibility(&mut self, scale: f64) -> bool {
        let visible = scale >= OVERLAY_MIN_SCALE;
        if visible == self.visible {
            return false;
        }
        self.visible = visible;
        true
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Derives the overlay for the current projection state. Idempotent:
    /// the same fit state yields the same snapshot on every show.
    pub fn extract(
        &self,
        disputed: &DisputedCollection,
        projection: &Projection,
        metrics: &dyn LabelMetrics,
    ) -> DisputedSnapshot {
        let mut snapshot = DisputedSnapshot::default();

        for (line_index, line) in disputed.lines.iter().enumerate() {
            for strand in projection.path_for(&line.geometry) {
                snapshot
                    .paths
                    .push(strand.into_iter().map(|v| [v.x, v.y]).collect());
            }
            snapshot
                .annotations
                .push(self.annotate(line_index, line, projection, metrics));
        }

        snapshot
    }

    fn annotate(
        &self,
        line_index: usize,
        line: &DisputedLine,
        projection: &Projection,
        metrics: &dyn LabelMetrics,
    ) -> DisputedAnnotation {
        let centroid = projection.centroid_of(&line.geometry);
        let side = self.sides.side_for(&line.label);
        let label_position = match side {
            Some(LabelSide::Top) => [centroid.x, centroid.y - LABEL_OFFSET],
            Some(LabelSide::Bottom) => [centroid.x, centroid.y + LABEL_OFFSET],
            None => [centroid.x, centroid.y],
        };

        let leader = nearest_point_on_line(&line.geometry, projection.invert(centroid))
            .map(|nearest| {
                let target = projection.project(nearest);
                let [_, label_h] = metrics.measure(&line.label);
                // Leave from the box edge facing the border.
                let start_y = if target.y >= label_position[1] {
                    label_position[1] + label_h / 2.0
                } else {
                    label_position[1] - label_h / 2.0
                };
                [[label_position[0], start_y], [target.x, target.y]]
            });

        DisputedAnnotation {
            line_index,
            label: line.label.clone(),
            centroid: [centroid.x, centroid.y],
            label_position,
            side,
            leader,
        }
    }
}
