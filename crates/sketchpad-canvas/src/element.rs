//! Drawing Elements
//!
//! The drawing vocabulary a surface records. Coordinates are in viewport
//! units (inches). Elements are decoded from the JSON records a script's
//! capability object produces, so the field names here are the wire names.

use serde::{Deserialize, Serialize};

/// Presentation attributes shared by every element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    /// Fill paint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    /// Stroke paint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    /// Stroke width in viewport units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    /// Opacity in `0..=1`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl Style {
    /// Style with only a fill
    #[must_use]
    pub fn fill(color: impl Into<String>) -> Self {
        Self {
            fill: Some(color.into()),
            ..Self::default()
        }
    }

    /// Style with only a stroke
    #[must_use]
    pub fn stroke(color: impl Into<String>, width: f64) -> Self {
        Self {
            stroke: Some(color.into()),
            stroke_width: Some(width),
            ..Self::default()
        }
    }

    /// SVG attribute pairs for this style, in a stable order
    #[must_use]
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let mut attrs = Vec::new();
        if let Some(fill) = &self.fill {
            attrs.push(("fill", fill.clone()));
        }
        if let Some(stroke) = &self.stroke {
            attrs.push(("stroke", stroke.clone()));
        }
        if let Some(width) = self.stroke_width {
            attrs.push(("stroke-width", width.to_string()));
        }
        if let Some(opacity) = self.opacity {
            attrs.push(("opacity", opacity.to_string()));
        }
        attrs
    }
}

/// A single drawing command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Element {
    /// Axis-aligned rectangle
    Rect {
        /// Left edge
        x: f64,
        /// Top edge
        y: f64,
        /// Width
        width: f64,
        /// Height
        height: f64,
        /// Presentation attributes
        #[serde(default)]
        style: Style,
    },

    /// Circle
    Circle {
        /// Center x
        cx: f64,
        /// Center y
        cy: f64,
        /// Radius
        r: f64,
        /// Presentation attributes
        #[serde(default)]
        style: Style,
    },

    /// Ellipse
    Ellipse {
        /// Center x
        cx: f64,
        /// Center y
        cy: f64,
        /// Horizontal radius
        rx: f64,
        /// Vertical radius
        ry: f64,
        /// Presentation attributes
        #[serde(default)]
        style: Style,
    },

    /// Straight line segment
    Line {
        /// Start x
        x1: f64,
        /// Start y
        y1: f64,
        /// End x
        x2: f64,
        /// End y
        y2: f64,
        /// Presentation attributes
        #[serde(default)]
        style: Style,
    },

    /// Open polyline
    Polyline {
        /// Vertices
        points: Vec<[f64; 2]>,
        /// Presentation attributes
        #[serde(default)]
        style: Style,
    },

    /// Closed polygon
    Polygon {
        /// Vertices
        points: Vec<[f64; 2]>,
        /// Presentation attributes
        #[serde(default)]
        style: Style,
    },

    /// Raw SVG path data
    Path {
        /// Path data (`d` attribute)
        d: String,
        /// Presentation attributes
        #[serde(default)]
        style: Style,
    },

    /// Text run
    Text {
        /// Baseline x
        x: f64,
        /// Baseline y
        y: f64,
        /// Text content
        content: String,
        /// Font size in viewport units
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size: Option<f64>,
        /// Presentation attributes
        #[serde(default)]
        style: Style,
    },
}

impl Element {
    /// Create a circle
    #[must_use]
    pub fn circle(cx: f64, cy: f64, r: f64, style: Style) -> Self {
        Self::Circle { cx, cy, r, style }
    }

    /// Create a rectangle
    #[must_use]
    pub fn rect(x: f64, y: f64, width: f64, height: f64, style: Style) -> Self {
        Self::Rect {
            x,
            y,
            width,
            height,
            style,
        }
    }

    /// Create a line
    #[must_use]
    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64, style: Style) -> Self {
        Self::Line {
            x1,
            y1,
            x2,
            y2,
            style,
        }
    }

    /// SVG tag name for this element
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Rect { .. } => "rect",
            Self::Circle { .. } => "circle",
            Self::Ellipse { .. } => "ellipse",
            Self::Line { .. } => "line",
            Self::Polyline { .. } => "polyline",
            Self::Polygon { .. } => "polygon",
            Self::Path { .. } => "path",
            Self::Text { .. } => "text",
        }
    }

    /// Presentation attributes of this element
    #[must_use]
    pub fn style(&self) -> &Style {
        match self {
            Self::Rect { style, .. }
            | Self::Circle { style, .. }
            | Self::Ellipse { style, .. }
            | Self::Line { style, .. }
            | Self::Polyline { style, .. }
            | Self::Polygon { style, .. }
            | Self::Path { style, .. }
            | Self::Text { style, .. } => style,
        }
    }

    /// Geometry attribute pairs, in a stable order
    #[must_use]
    pub fn geometry(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Rect {
                x,
                y,
                width,
                height,
                ..
            } => vec![
                ("x", x.to_string()),
                ("y", y.to_string()),
                ("width", width.to_string()),
                ("height", height.to_string()),
            ],
            Self::Circle { cx, cy, r, .. } => vec![
                ("cx", cx.to_string()),
                ("cy", cy.to_string()),
                ("r", r.to_string()),
            ],
            Self::Ellipse { cx, cy, rx, ry, .. } => vec![
                ("cx", cx.to_string()),
                ("cy", cy.to_string()),
                ("rx", rx.to_string()),
                ("ry", ry.to_string()),
            ],
            Self::Line { x1, y1, x2, y2, .. } => vec![
                ("x1", x1.to_string()),
                ("y1", y1.to_string()),
                ("x2", x2.to_string()),
                ("y2", y2.to_string()),
            ],
            Self::Polyline { points, .. } | Self::Polygon { points, .. } => {
                vec![("points", format_points(points))]
            }
            Self::Path { d, .. } => vec![("d", d.clone())],
            Self::Text { x, y, size, .. } => {
                let mut attrs = vec![("x", x.to_string()), ("y", y.to_string())];
                if let Some(size) = size {
                    attrs.push(("font-size", size.to_string()));
                }
                attrs
            }
        }
    }
}

fn format_points(points: &[[f64; 2]]) -> String {
    points
        .iter()
        .map(|[x, y]| format!("{x},{y}"))
        .collect::<Vec<_>>()
        .join(" ")
}
