#![forbid(unsafe_code)]

//! Interprets declarative visualization specs into timed 2D draw
//! instructions.
//!
//! The pipeline is explicitly staged:
//!
//! 1. A [`VisualizationSpec`] arrives from an [`ExplanationProvider`]
//!    (parsed with [`parse_explanation`]) or is built directly.
//! 2. A [`Playback`] session drives per-tick evaluation against a [`Clock`],
//!    scheduling itself through a [`TickScheduler`].
//! 3. Each tick yields a [`Frame`] of [`DrawInstruction`]s for a generic
//!    2D vector surface of [`CANVAS`] logical units.
//!
//! Evaluation ([`Evaluator::eval_layers`]) is a pure function of the spec
//! and elapsed time; the playback session owns the only mutable state.

pub mod error;
pub mod eval;
pub mod model;
pub mod playback;
pub mod provider;
pub mod render;

pub use error::{VizflowError, VizflowResult};
pub use eval::{Evaluator, LayerState};
pub use model::{AnimationRule, CANVAS, Canvas, Layer, PropValue, ShapeKind, VisualizationSpec};
pub use playback::{Clock, Playback, SystemClock, TickHandle, TickScheduler};
pub use provider::{ExplanationProvider, ExplanationResponse, parse_explanation, prepare_question};
pub use render::{ArrowMarker, DrawInstruction, Frame, Paint, render_frame, render_layer};
