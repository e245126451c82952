//! `MarketEvent`: the fixed-size, ring-resident event slot type
//!
//! Every field is `Copy`/`Default` so the type satisfies the ring-bus slot
//! bound (`T: Copy + Default`). Total size is intentionally not padded to a
//! cache line itself (the ring pads *sequences*, not slots, see
//! `ringbus::spmc`); slot density matters more than per-slot isolation here.

use crate::model::symbol::SymbolId;

/// Maximum number of price levels carried inline in a `Depth` payload.
pub const MAX_DEPTH_LEVELS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum MarketEventKind {
    /// Sentinel used for stop signals and ring padding; always skipped by consumers.
    #[default]
    None = 0,
    Ticker = 1,
    Trade = 2,
    Kline = 3,
    Depth = 4,
    MarkPrice = 5,
    OrderReport = 6,
}

/// A single (price, size) book level.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceLevel {
    pub price: f64,
    pub size: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TickerPayload {
    pub last_price: f64,
    pub bid_price: f64,
    pub ask_price: f64,
    pub bid_size: f64,
    pub ask_size: f64,
    pub volume_24h: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TradePayload {
    pub price: f64,
    pub quantity: f64,
    /// true if the trade's aggressor side was the buyer.
    pub is_buyer_maker: bool,
    pub trade_id: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KlinePayload {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    /// Interned interval tag (e.g. "1m"), see `model::symbol::SymbolTable`.
    pub interval_id: SymbolId,
    pub is_closed: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DepthPayload {
    pub bids: [PriceLevel; MAX_DEPTH_LEVELS],
    pub asks: [PriceLevel; MAX_DEPTH_LEVELS],
    pub bid_count: u8,
    pub ask_count: u8,
    /// true for a full snapshot, false for an incremental update.
    pub is_snapshot: bool,
    pub last_update_id: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkPricePayload {
    pub mark_price: f64,
    pub index_price: f64,
    pub funding_rate: f64,
    pub next_funding_time_ms: i64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OrderReportPayload {
    pub local_order_id: u64,
    pub state: crate::model::order::OrderState,
    pub filled_quantity: f64,
    pub filled_avg_price: f64,
}

/// Union of kind-specific payloads. Only the field matching `kind` is
/// meaningful; callers must branch on `kind` before reading.
#[derive(Debug, Clone, Copy)]
pub union MarketPayloadRaw {
    pub ticker: TickerPayload,
    pub trade: TradePayload,
    pub kline: KlinePayload,
    pub depth: DepthPayload,
    pub mark_price: MarkPricePayload,
    pub order_report: OrderReportPayload,
}

impl Default for MarketPayloadRaw {
    fn default() -> Self {
        // All variants are valid when zeroed (floats 0.0, bools false, enums
        // with a zero discriminant) so this is safe without reading the union.
        Self { ticker: TickerPayload::default() }
    }
}

/// The fixed-size, ring-resident market event slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarketEvent {
    pub kind: MarketEventKind,
    pub symbol_id: SymbolId,
    pub venue_id: u8,
    /// Producer-assigned sequence, monotonically non-decreasing per producer.
    pub sequence: u32,
    pub gen_ts_ns: i64,
    pub payload: MarketPayloadRaw,
}

impl MarketEvent {
    /// A `None`-kind slot, used as a ring stop sentinel.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        self.kind == MarketEventKind::None
    }

    pub fn ticker(symbol_id: SymbolId, venue_id: u8, sequence: u32, gen_ts_ns: i64, payload: TickerPayload) -> Self {
        Self {
            kind: MarketEventKind::Ticker,
            symbol_id,
            venue_id,
            sequence,
            gen_ts_ns,
            payload: MarketPayloadRaw { ticker: payload },
        }
    }

    pub fn trade(symbol_id: SymbolId, venue_id: u8, sequence: u32, gen_ts_ns: i64, payload: TradePayload) -> Self {
        Self {
            kind: MarketEventKind::Trade,
            symbol_id,
            venue_id,
            sequence,
            gen_ts_ns,
            payload: MarketPayloadRaw { trade: payload },
        }
    }

    pub fn kline(symbol_id: SymbolId, venue_id: u8, sequence: u32, gen_ts_ns: i64, payload: KlinePayload) -> Self {
        Self {
            kind: MarketEventKind::Kline,
            symbol_id,
            venue_id,
            sequence,
            gen_ts_ns,
            payload: MarketPayloadRaw { kline: payload },
        }
    }

    pub fn depth(symbol_id: SymbolId, venue_id: u8, sequence: u32, gen_ts_ns: i64, payload: DepthPayload) -> Self {
        Self {
            kind: MarketEventKind::Depth,
            symbol_id,
            venue_id,
            sequence,
            gen_ts_ns,
            payload: MarketPayloadRaw { depth: payload },
        }
    }

    pub fn mark_price(symbol_id: SymbolId, venue_id: u8, sequence: u32, gen_ts_ns: i64, payload: MarkPricePayload) -> Self {
        Self {
            kind: MarketEventKind::MarkPrice,
            symbol_id,
            venue_id,
            sequence,
            gen_ts_ns,
            payload: MarketPayloadRaw { mark_price: payload },
        }
    }

    pub fn order_report(symbol_id: SymbolId, venue_id: u8, sequence: u32, gen_ts_ns: i64, payload: OrderReportPayload) -> Self {
        Self {
            kind: MarketEventKind::OrderReport,
            symbol_id,
            venue_id,
            sequence,
            gen_ts_ns,
            payload: MarketPayloadRaw { order_report: payload },
        }
    }

    /// Read the ticker payload; caller must have checked `kind == Ticker`.
    pub fn as_ticker(&self) -> Option<TickerPayload> {
        (self.kind == MarketEventKind::Ticker).then(|| unsafe { self.payload.ticker })
    }

    pub fn as_trade(&self) -> Option<TradePayload> {
        (self.kind == MarketEventKind::Trade).then(|| unsafe { self.payload.trade })
    }

    pub fn as_kline(&self) -> Option<KlinePayload> {
        (self.kind == MarketEventKind::Kline).then(|| unsafe { self.payload.kline })
    }

    pub fn as_depth(&self) -> Option<DepthPayload> {
        (self.kind == MarketEventKind::Depth).then(|| unsafe { self.payload.depth })
    }

    pub fn as_mark_price(&self) -> Option<MarkPricePayload> {
        (self.kind == MarketEventKind::MarkPrice).then(|| unsafe { self.payload.mark_price })
    }

    pub fn as_order_report(&self) -> Option<OrderReportPayload> {
        (self.kind == MarketEventKind::OrderReport).then(|| unsafe { self.payload.order_report })
    }
}
