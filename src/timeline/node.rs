//! Owned visual nodes produced by the cell renderers.
//!
//! A node is a tiny retained description of what to paint: a root box
//! positioned on the day axis and one shape child (the diamond of a
//! milestone, the body of a bar). The chart painter turns it into egui
//! shapes every frame; renderers mutate it in place between frames.

use egui::Color32;

pub const TIMELINE_ELEMENT_CLASS: &str = "timeline-element";
pub const DIAMOND_CLASS: &str = "diamond";
pub const BAR_CLASS: &str = "bar";
pub const SELECTABLE_CLASS: &str = "active-selection-mode";

/// Styling of a single box.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementBox {
    pub classes: Vec<&'static str>,
    /// Horizontal offset from the timeline origin (root) or from the
    /// parent's left edge (child).
    pub left: f32,
    pub margin_left: f32,
    pub width: f32,
    pub height: f32,
    pub background: Option<Color32>,
    pub pointer_events: bool,
}

impl ElementBox {
    pub fn new(classes: &[&'static str]) -> Self {
        Self {
            classes: classes.to_vec(),
            left: 0.0,
            margin_left: 0.0,
            width: 0.0,
            height: 0.0,
            background: None,
            pointer_events: true,
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(&class)
    }

    pub fn set_class(&mut self, class: &'static str, on: bool) {
        let present = self.has_class(class);
        if on && !present {
            self.classes.push(class);
        } else if !on && present {
            self.classes.retain(|c| *c != class);
        }
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }
}

/// What kind of shape the child box represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Diamond,
    Bar,
}

/// A rendered timeline cell: the root element plus an explicit reference to
/// its shape child, so updates never need to search the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct CellNode {
    pub root: ElementBox,
    pub shape: ElementBox,
    pub kind: ShapeKind,
}

impl CellNode {
    /// Absolute x of the shape's left edge relative to the timeline origin.
    pub fn shape_left(&self) -> f32 {
        self.root.left + self.shape.left + self.shape.margin_left
    }

    /// Horizontal extent `(left, right)` of the shape on the timeline.
    pub fn shape_span(&self) -> (f32, f32) {
        let left = self.shape_left();
        (left, left + self.shape.width)
    }
}
