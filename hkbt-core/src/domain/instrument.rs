//! Symbol metadata table (spec.md §6): `{lotSize, isETF, displayName}`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub display_name: String,
    pub lot_size: u64,
    pub is_etf: bool,
}

impl Instrument {
    pub fn new(symbol: impl Into<String>, lot_size: u64, is_etf: bool) -> Self {
        let symbol = symbol.into();
        Self {
            display_name: symbol.clone(),
            symbol,
            lot_size,
            is_etf,
        }
    }

    /// Quantize a desired quantity down to a whole multiple of the lot size.
    pub fn round_to_lot(&self, quantity: f64) -> u64 {
        let lots = (quantity / self.lot_size as f64).floor();
        (lots.max(0.0) as u64) * self.lot_size
    }
}

/// Per-symbol overrides; default `lotSize=100`, `isETF=false` (spec.md §6).
#[derive(Debug, Clone, Default)]
pub struct InstrumentTable {
    overrides: HashMap<String, Instrument>,
}

impl InstrumentTable {
    pub fn new() -> Self {
        let mut overrides = HashMap::new();
        overrides.insert("00005.HK".into(), Instrument::new("00005.HK", 400, false));
        overrides.insert("00939.HK".into(), Instrument::new("00939.HK", 1000, false));
        overrides.insert("01299.HK".into(), Instrument::new("01299.HK", 500, false));
        for etf in ["02800.HK", "03033.HK"] {
            overrides.insert(etf.into(), Instrument::new(etf, 100, true));
        }
        Self { overrides }
    }

    pub fn insert(&mut self, instrument: Instrument) {
        self.overrides.insert(instrument.symbol.clone(), instrument);
    }

    pub fn lookup(&self, symbol: &str) -> Instrument {
        self.overrides
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| Instrument::new(symbol, 100, false))
    }
}
