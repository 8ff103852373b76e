use std::collections::BTreeMap;

use crate::model::{AnimationRule, Layer, PropValue, ShapeKind};

/// The evaluated copy of one layer at a given elapsed time. Owned by the
/// current playback run; rebuilt wholesale on every tick.
#[derive(Clone, Debug, serde::Serialize)]
pub struct LayerState {
    pub id: String,
    pub kind: ShapeKind,
    pub props: BTreeMap<String, PropValue>,
}

impl LayerState {
    /// Snapshot of a layer's base props, before any rule applies. This is
    /// what the first paint shows.
    pub fn base(layer: &Layer) -> Self {
        Self {
            id: layer.id.clone(),
            kind: layer.kind.clone(),
            props: layer.props.clone(),
        }
    }
}

pub struct Evaluator;

impl Evaluator {
    /// Resolves every layer's effective props at `elapsed_ms`.
    ///
    /// Pure and idempotent: the same `(layers, elapsed_ms)` input always
    /// produces bit-identical output, and the base layers are never mutated.
    /// Rules are applied in declaration order, so a later rule targeting the
    /// same property overwrites an earlier one's contribution outright.
    #[tracing::instrument(skip(layers))]
    pub fn eval_layers(layers: &[Layer], elapsed_ms: f64) -> Vec<LayerState> {
        layers
            .iter()
            .map(|layer| eval_layer(layer, elapsed_ms))
            .collect()
    }
}

fn eval_layer(layer: &Layer, elapsed_ms: f64) -> LayerState {
    let mut state = LayerState::base(layer);
    for rule in &layer.animations {
        state.props.insert(
            rule.property.clone(),
            PropValue::Number(rule_value(rule, elapsed_ms)),
        );
    }
    state
}

/// Resolves one rule's value at `elapsed_ms`.
///
/// Before the window the property holds `from`, after it `to`. Inside the
/// inclusive window the value is linearly interpolated; a zero-length window
/// snaps straight to `to`.
fn rule_value(rule: &AnimationRule, elapsed_ms: f64) -> f64 {
    if elapsed_ms < rule.start_ms {
        return rule.from;
    }
    if elapsed_ms > rule.end_ms {
        return rule.to;
    }

    let window = rule.end_ms - rule.start_ms;
    let progress = if window > 0.0 {
        ((elapsed_ms - rule.start_ms) / window).clamp(0.0, 1.0)
    } else {
        1.0
    };
    rule.from + (rule.to - rule.from) * progress
}
