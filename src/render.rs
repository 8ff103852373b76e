use std::collections::BTreeMap;

use kurbo::{Affine, Point};

use crate::eval::LayerState;
use crate::model::{PropValue, ShapeKind};

/// Paint attributes shared by all shapes. `None` means the attribute was not
/// set on the layer and the surface's own default applies (opaque, hairline
/// stroke), mirroring an absent attribute on a vector surface.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct Paint {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub opacity: Option<f64>,
}

/// Arrowhead marker resource, keyed by the owning layer's id so two arrow
/// layers never share a head definition.
#[derive(Clone, Debug, serde::Serialize)]
pub struct ArrowMarker {
    pub id: String,
    /// Orientation along the line's direction: atan2(dy, dx).
    pub angle_rad: f64,
    /// Heads are filled with the line's stroke color; they do not scale
    /// with stroke width.
    pub fill: String,
}

/// One resolved shape for the 2D surface renderer to paint.
#[derive(Clone, Debug, serde::Serialize)]
pub enum DrawInstruction {
    Circle {
        center: Point,
        radius: f64,
        paint: Paint,
        /// Rotation about the shape's own (x, y) anchor.
        transform: Affine,
    },
    Rect {
        /// Rectangles are positioned by center (x, y); this is the derived
        /// top-left corner.
        top_left: Point,
        width: f64,
        height: f64,
        paint: Paint,
        transform: Affine,
    },
    Line {
        from: Point,
        to: Point,
        paint: Paint,
    },
    Arrow {
        from: Point,
        to: Point,
        paint: Paint,
        marker: ArrowMarker,
    },
}

/// Everything the surface needs to paint one tick: instructions in layer
/// (paint) order plus the marker definitions they reference.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Frame {
    pub elapsed_ms: f64,
    pub instructions: Vec<DrawInstruction>,
    pub markers: BTreeMap<String, ArrowMarker>,
}

fn num(props: &BTreeMap<String, PropValue>, key: &str) -> f64 {
    props.get(key).and_then(PropValue::as_number).unwrap_or(0.0)
}

fn opt_num(props: &BTreeMap<String, PropValue>, key: &str) -> Option<f64> {
    props.get(key).and_then(PropValue::as_number)
}

fn text(props: &BTreeMap<String, PropValue>, key: &str) -> Option<String> {
    props
        .get(key)
        .and_then(PropValue::as_text)
        .map(str::to_string)
}

fn paint(props: &BTreeMap<String, PropValue>) -> Paint {
    Paint {
        fill: text(props, "fill"),
        stroke: text(props, "stroke"),
        stroke_width: opt_num(props, "strokeWidth"),
        opacity: opt_num(props, "opacity"),
    }
}

/// Rotation about the shape's own (x, y) anchor, not the canvas origin.
/// `rotation` is in degrees; unset means no rotation.
fn rotation(props: &BTreeMap<String, PropValue>) -> Affine {
    let degrees = num(props, "rotation");
    if degrees == 0.0 {
        return Affine::IDENTITY;
    }
    let anchor = Point::new(num(props, "x"), num(props, "y"));
    Affine::rotate_about(degrees.to_radians(), anchor)
}

/// Maps one evaluated layer to a draw instruction. Unrecognized shape kinds
/// produce `None` rather than an error; sibling layers are unaffected.
pub fn render_layer(state: &LayerState) -> Option<DrawInstruction> {
    let props = &state.props;
    match &state.kind {
        ShapeKind::Circle => Some(DrawInstruction::Circle {
            center: Point::new(num(props, "x"), num(props, "y")),
            radius: num(props, "r"),
            paint: paint(props),
            transform: rotation(props),
        }),
        ShapeKind::Rectangle => {
            let width = num(props, "width");
            let height = num(props, "height");
            Some(DrawInstruction::Rect {
                top_left: Point::new(
                    num(props, "x") - width / 2.0,
                    num(props, "y") - height / 2.0,
                ),
                width,
                height,
                paint: paint(props),
                transform: rotation(props),
            })
        }
        ShapeKind::Line => Some(DrawInstruction::Line {
            from: Point::new(num(props, "x1"), num(props, "y1")),
            to: Point::new(num(props, "x2"), num(props, "y2")),
            paint: paint(props),
        }),
        ShapeKind::Arrow => {
            let from = Point::new(num(props, "x1"), num(props, "y1"));
            let to = Point::new(num(props, "x2"), num(props, "y2"));
            let stroke = text(props, "stroke").unwrap_or_else(|| "white".to_string());
            let mut paint = paint(props);
            paint.stroke = Some(stroke.clone());
            if paint.stroke_width.is_none() {
                paint.stroke_width = Some(2.0);
            }
            Some(DrawInstruction::Arrow {
                from,
                to,
                paint,
                marker: ArrowMarker {
                    id: format!("arrowhead-{}", state.id),
                    angle_rad: (to.y - from.y).atan2(to.x - from.x),
                    fill: stroke,
                },
            })
        }
        ShapeKind::Other(kind) => {
            tracing::warn!(layer = %state.id, kind = %kind, "skipping unrecognized shape kind");
            None
        }
    }
}

/// Assembles the full draw list for one tick. All layers are evaluated
/// before this is called, so a consumer never sees a partially-updated
/// frame. Colliding marker ids (duplicate layer ids) resolve to the last
/// definition.
pub fn render_frame(states: &[LayerState], elapsed_ms: f64) -> Frame {
    let mut instructions = Vec::with_capacity(states.len());
    let mut markers = BTreeMap::new();

    for state in states {
        let Some(instruction) = render_layer(state) else {
            continue;
        };
        if let DrawInstruction::Arrow { marker, .. } = &instruction {
            if markers.insert(marker.id.clone(), marker.clone()).is_some() {
                tracing::warn!(marker = %marker.id, "arrowhead marker id collision; last definition wins");
            }
        }
        instructions.push(instruction);
    }

    Frame {
        elapsed_ms,
        instructions,
        markers,
    }
}
