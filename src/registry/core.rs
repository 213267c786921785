use std::collections::HashMap;

use blake3::Hash;
use serde::Serialize;
use serde_json::json;

use crate::color::{Rgb, TextColor, contrast_text_color};
use crate::geometry::Bounds;
use crate::logging::LogFields;

/// Position of a rectangle in registry insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RectId(pub usize);

/// One prefix group laid out on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rectangle {
    /// Concatenated display texts of every ancestor plus this one.
    pub path: String,
    pub bounds: Bounds,
    pub display_text: String,
    pub base_color: Rgb,
    pub item_count: usize,
    pub depth: usize,
    pub parent: Option<RectId>,
    pub children: Vec<RectId>,
    selected: bool,
    fill: Rgb,
    text_color: TextColor,
}

impl Rectangle {
    pub fn new(
        path: String,
        display_text: String,
        bounds: Bounds,
        base_color: Rgb,
        item_count: usize,
        depth: usize,
    ) -> Self {
        Self {
            path,
            bounds,
            display_text,
            base_color,
            item_count,
            depth,
            parent: None,
            children: Vec::new(),
            selected: false,
            fill: base_color,
            text_color: contrast_text_color(base_color),
        }
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Colour currently displayed: the base colour, or its highlight when selected.
    pub fn fill(&self) -> Rgb {
        self.fill
    }

    pub fn text_color(&self) -> TextColor {
        self.text_color
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Derived colours are always recomputed from `base_color`, never from
    /// the previously displayed fill.
    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
        self.fill = if selected {
            self.base_color.highlight()
        } else {
            self.base_color
        };
        self.text_color = contrast_text_color(self.fill);
    }
}

/// Right-aligned label recording names that end exactly at a prefix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    /// Full name the label refers to.
    pub path: String,
    /// `"<path> : <count>"`.
    pub text: String,
    pub count: usize,
    pub anchor_x: f64,
    pub y0: f64,
    pub y1: f64,
}

impl Annotation {
    pub fn new(path: String, count: usize, anchor_x: f64, y0: f64, y1: f64) -> Self {
        let text = format!("{path} : {count}");
        Self {
            path,
            text,
            count,
            anchor_x,
            y0,
            y1,
        }
    }

    pub fn mid_y(&self) -> f64 {
        (self.y0 + self.y1) / 2.0
    }
}

/// Counters collected while a registry is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub items: usize,
    pub runs_scanned: usize,
    pub runs_dropped: usize,
    pub rectangles: usize,
    pub annotations: usize,
    pub max_depth: usize,
}

impl BuildStats {
    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("items".to_string(), json!(self.items));
        map.insert("runs_scanned".to_string(), json!(self.runs_scanned));
        map.insert("runs_dropped".to_string(), json!(self.runs_dropped));
        map.insert("rectangles".to_string(), json!(self.rectangles));
        map.insert("annotations".to_string(), json!(self.annotations));
        map.insert("max_depth".to_string(), json!(self.max_depth));
        map
    }
}

/// Every rectangle of one build, in depth-first pre-order, addressable by
/// prefix path or by [`RectId`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    rects: Vec<Rectangle>,
    by_path: HashMap<String, RectId>,
    annotations: Vec<Annotation>,
    stats: BuildStats,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn get(&self, id: RectId) -> Option<&Rectangle> {
        self.rects.get(id.0)
    }

    pub fn by_path(&self, path: &str) -> Option<&Rectangle> {
        self.id_of(path).and_then(|id| self.get(id))
    }

    pub fn id_of(&self, path: &str) -> Option<RectId> {
        self.by_path.get(path).copied()
    }

    /// Rectangles in insertion (depth-first pre-order) order.
    pub fn iter(&self) -> impl Iterator<Item = (RectId, &Rectangle)> {
        self.rects.iter().enumerate().map(|(idx, rect)| (RectId(idx), rect))
    }

    /// Top-level rectangles, top to bottom.
    pub fn roots(&self) -> impl Iterator<Item = &Rectangle> {
        self.rects.iter().filter(|rect| rect.parent.is_none())
    }

    pub fn children_of(&self, id: RectId) -> impl Iterator<Item = &Rectangle> {
        self.get(id)
            .map(|rect| rect.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.get(*child))
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    /// Content hash over geometry, colours, selection and annotations.
    pub fn fingerprint(&self) -> Hash {
        let mut hasher = blake3::Hasher::new();
        for rect in &self.rects {
            hasher.update(rect.path.as_bytes());
            hasher.update(&[0]);
            for edge in [rect.bounds.x0, rect.bounds.y0, rect.bounds.x1, rect.bounds.y1] {
                hasher.update(&edge.to_bits().to_le_bytes());
            }
            hasher.update(&rect.base_color.channels());
            hasher.update(&[u8::from(rect.selected)]);
            hasher.update(&(rect.item_count as u64).to_le_bytes());
        }
        for note in &self.annotations {
            hasher.update(note.text.as_bytes());
            hasher.update(&[0]);
            hasher.update(&note.y0.to_bits().to_le_bytes());
        }
        hasher.finalize()
    }

    pub(crate) fn get_mut(&mut self, id: RectId) -> Option<&mut Rectangle> {
        self.rects.get_mut(id.0)
    }

    /// Append a rectangle, linking it under `parent` when given.
    pub(crate) fn insert(&mut self, mut rect: Rectangle, parent: Option<RectId>) -> RectId {
        let id = RectId(self.rects.len());
        rect.parent = parent;
        self.by_path.insert(rect.path.clone(), id);
        self.rects.push(rect);
        if let Some(parent) = parent.and_then(|p| self.rects.get_mut(p.0)) {
            parent.children.push(id);
        }
        id
    }

    pub(crate) fn push_annotation(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    pub(crate) fn set_stats(&mut self, stats: BuildStats) {
        self.stats = stats;
    }
}
