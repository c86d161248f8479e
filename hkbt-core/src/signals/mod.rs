//! Signal generation: a four-layer weighted-scoring filter over a regime
//! selector that dispatches to per-regime strategies.
//!
//! Signal evaluation never touches portfolio state (positions, equity) — it
//! reads only indicator snapshots and emits a candidate `TradingSignal` for
//! the simulator to size and fill.

pub mod engine;
pub mod layers;
pub mod regime;
pub mod strategies;

pub use engine::{EvaluateContext, SignalEngine};
pub use layers::LayerScores;
pub use regime::Regime;
pub use strategies::{EntryCandidate, EntryContext, StopPlan, Strategy, TakeProfitPlan};
