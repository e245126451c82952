//! Symbol interning and venue identifiers
//!
//! Ring-resident events carry a 16-bit interned symbol id rather than a
//! `String`, so the hot path never allocates. `SymbolTable` is the single
//! owner of the id <-> name mapping and is shared (read-mostly) across
//! producer and consumer threads.

use parking_lot::RwLock;
use std::collections::HashMap;

/// Interned symbol id, unique within a running process.
pub type SymbolId = u16;

/// Sentinel for "no symbol" (control/sentinel slots).
pub const NONE_SYMBOL: SymbolId = 0;

/// Venue identifier carried inline in ring-resident events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VenueId {
    Unknown = 0,
    Binance = 1,
    Okx = 2,
}

impl VenueId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Binance => "binance",
            Self::Okx => "okx",
        }
    }

    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Binance,
            2 => Self::Okx,
            _ => Self::Unknown,
        }
    }
}

/// Market type a symbol trades under, used for adapter URL/endpoint selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarketType {
    Spot,
    UsdtFutures,
    CoinFutures,
}

/// Bidirectional symbol-name interning table.
///
/// `intern` is the only mutating operation; lookups are lock-free-ish reads
/// guarded by a `parking_lot::RwLock` (uncontended after warm-up, since
/// symbol sets are established early and rarely grow).
#[derive(Debug, Default)]
pub struct SymbolTable {
    inner: RwLock<SymbolTableInner>,
}

#[derive(Debug, Default)]
struct SymbolTableInner {
    by_name: HashMap<String, SymbolId>,
    by_id: Vec<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut inner = SymbolTableInner::default();
        // id 0 is reserved as NONE_SYMBOL.
        inner.by_id.push(String::new());
        Self { inner: RwLock::new(inner) }
    }

    /// Intern `name`, returning its id. Idempotent for a given name.
    pub fn intern(&self, name: &str) -> SymbolId {
        if let Some(id) = self.get(name) {
            return id;
        }
        let mut inner = self.inner.write();
        // Re-check under the write lock in case of a race with another interner.
        if let Some(&id) = inner.by_name.get(name) {
            return id;
        }
        let id = inner.by_id.len() as SymbolId;
        inner.by_id.push(name.to_string());
        inner.by_name.insert(name.to_string(), id);
        id
    }

    /// Look up an already-interned symbol's id.
    pub fn get(&self, name: &str) -> Option<SymbolId> {
        let inner = self.inner.read();
        inner.by_name.get(name).copied()
    }

    /// Resolve an id back to its name.
    pub fn name_of(&self, id: SymbolId) -> Option<String> {
        let inner = self.inner.read();
        inner.by_id.get(id as usize).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_id.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
