use std::collections::BTreeMap;

use crate::error::{VizflowError, VizflowResult};

/// The logical drawing surface. All spec coordinates are expressed in these
/// units; scaling to device pixels is the display shell's concern.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

pub const CANVAS: Canvas = Canvas {
    width: 500,
    height: 300,
};

/// A declarative description of shapes and their time-bounded property
/// transitions. Immutable once constructed; playback never mutates it.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct VisualizationSpec {
    pub id: String,
    /// Total playback length in milliseconds.
    #[serde(rename = "duration")]
    pub duration_ms: f64,
    /// Advisory hint only. Evaluation is time-based, not frame-count-based.
    pub fps: f64,
    /// Paint order: later layers draw on top.
    pub layers: Vec<Layer>,
}

/// One shape instance within a spec.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    /// Open-ended property bag. Shape mapping reads only the keys it
    /// recognizes for its kind and ignores the rest.
    #[serde(default)]
    pub props: BTreeMap<String, PropValue>,
    #[serde(default)]
    pub animations: Vec<AnimationRule>,
}

/// Closed set of recognized shapes. Unrecognized wire values deserialize
/// into `Other` and are skipped at render time rather than rejected.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Line,
    Arrow,
    Other(String),
}

impl From<String> for ShapeKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "circle" => Self::Circle,
            "rectangle" => Self::Rectangle,
            "line" => Self::Line,
            "arrow" => Self::Arrow,
            _ => Self::Other(s),
        }
    }
}

impl From<ShapeKind> for String {
    fn from(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Circle => "circle".to_string(),
            ShapeKind::Rectangle => "rectangle".to_string(),
            ShapeKind::Line => "line".to_string(),
            ShapeKind::Arrow => "arrow".to_string(),
            ShapeKind::Other(s) => s,
        }
    }
}

/// A property value: numeric (positions, sizes, opacity) or textual
/// (colors, free-form attributes).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    Number(f64),
    Text(String),
}

impl PropValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s),
        }
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// A single time-bounded linear interpolation of one layer property.
/// The window `[start, end]` is inclusive and relative to playback start.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct AnimationRule {
    pub property: String,
    pub from: f64,
    pub to: f64,
    #[serde(rename = "start")]
    pub start_ms: f64,
    #[serde(rename = "end")]
    pub end_ms: f64,
}

impl VisualizationSpec {
    pub fn validate(&self) -> VizflowResult<()> {
        if !self.duration_ms.is_finite() || self.duration_ms < 0.0 {
            return Err(VizflowError::validation(
                "duration must be a finite number of milliseconds >= 0",
            ));
        }

        for layer in &self.layers {
            if layer.id.trim().is_empty() {
                return Err(VizflowError::validation("layer id must be non-empty"));
            }

            for rule in &layer.animations {
                if rule.property.trim().is_empty() {
                    return Err(VizflowError::validation(format!(
                        "layer '{}' has an animation with an empty property name",
                        layer.id
                    )));
                }
                if ![rule.from, rule.to, rule.start_ms, rule.end_ms]
                    .iter()
                    .all(|v| v.is_finite())
                {
                    return Err(VizflowError::animation(format!(
                        "layer '{}' animation on '{}' has a non-finite value",
                        layer.id, rule.property
                    )));
                }
                if rule.end_ms < rule.start_ms {
                    return Err(VizflowError::animation(format!(
                        "layer '{}' animation on '{}' has end < start",
                        layer.id, rule.property
                    )));
                }
                // start > duration is legal: the property holds `from` for
                // the whole visible playback.
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_spec() -> VisualizationSpec {
        let mut props = BTreeMap::new();
        props.insert("x".to_string(), PropValue::Number(100.0));
        props.insert("y".to_string(), PropValue::Number(200.0));
        props.insert("r".to_string(), PropValue::Number(20.0));
        props.insert("fill".to_string(), PropValue::from("#3498db"));
        VisualizationSpec {
            id: "vis_001".to_string(),
            duration_ms: 4000.0,
            fps: 30.0,
            layers: vec![Layer {
                id: "ball1".to_string(),
                kind: ShapeKind::Circle,
                props,
                animations: vec![AnimationRule {
                    property: "x".to_string(),
                    from: 100.0,
                    to: 400.0,
                    start_ms: 500.0,
                    end_ms: 3500.0,
                }],
            }],
        }
    }

    #[test]
    fn json_roundtrip_matches_wire_schema() {
        let spec = basic_spec();
        let s = serde_json::to_string_pretty(&spec).unwrap();
        assert!(s.contains("\"duration\": 4000.0"));
        assert!(s.contains("\"type\": \"circle\""));
        assert!(s.contains("\"start\": 500.0"));
        let de: VisualizationSpec = serde_json::from_str(&s).unwrap();
        assert_eq!(de.layers.len(), 1);
        assert_eq!(de.layers[0].kind, ShapeKind::Circle);
        assert_eq!(de.layers[0].animations[0].end_ms, 3500.0);
    }

    #[test]
    fn unknown_shape_kind_deserializes_as_other() {
        let json = r#"{ "id": "t", "type": "triangle", "props": {}, "animations": [] }"#;
        let layer: Layer = serde_json::from_str(json).unwrap();
        assert_eq!(layer.kind, ShapeKind::Other("triangle".to_string()));
    }

    #[test]
    fn props_accept_numbers_and_strings() {
        let json = r##"{ "id": "l", "type": "line", "props": { "x1": 10, "stroke": "#fff" } }"##;
        let layer: Layer = serde_json::from_str(json).unwrap();
        assert_eq!(layer.props["x1"], PropValue::Number(10.0));
        assert_eq!(layer.props["stroke"], PropValue::Text("#fff".to_string()));
        assert!(layer.animations.is_empty());
    }

    #[test]
    fn validate_rejects_negative_duration() {
        let mut spec = basic_spec();
        spec.duration_ms = -1.0;
        assert!(spec.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_window() {
        let mut spec = basic_spec();
        spec.layers[0].animations[0].start_ms = 2000.0;
        spec.layers[0].animations[0].end_ms = 1000.0;
        assert!(spec.validate().is_err());
    }

    #[test]
    fn validate_accepts_degenerate_window_and_late_start() {
        let mut spec = basic_spec();
        spec.layers[0].animations[0].start_ms = 1000.0;
        spec.layers[0].animations[0].end_ms = 1000.0;
        spec.layers[0].animations.push(AnimationRule {
            property: "y".to_string(),
            from: 200.0,
            to: 50.0,
            start_ms: 9000.0,
            end_ms: 9500.0,
        });
        spec.validate().unwrap();
    }

    #[test]
    fn validate_accepts_duplicate_layer_ids() {
        let mut spec = basic_spec();
        let dup = spec.layers[0].clone();
        spec.layers.push(dup);
        spec.validate().unwrap();
    }
}
