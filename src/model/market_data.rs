//! Rich, non-ring market-data mirror types
//!
//! Grounded on the original `TickerData` / `TradeData` / `OrderBookData` /
//! `KlineData` value objects (`core/data.h`), constructed by the adapter
//! parse layer and handed to EventFabric listeners alongside (not instead
//! of) the flat `MarketEvent` published onto the ring. These carry the
//! strategy-facing convenience accessors (`mid_price`, `spread`,
//! `best_bid`, ...) that the flat ring slot deliberately omits.

#[derive(Debug, Clone, Default)]
pub struct Ticker {
    pub symbol: String,
    pub exchange: String,
    pub last_price: f64,
    pub bid_price: Option<f64>,
    pub ask_price: Option<f64>,
    pub bid_size: Option<f64>,
    pub ask_size: Option<f64>,
    pub volume_24h: Option<f64>,
    pub high_24h: Option<f64>,
    pub low_24h: Option<f64>,
    pub open_24h: Option<f64>,
    pub ts_ns: i64,
}

impl Ticker {
    pub fn mid_price(&self) -> Option<f64> {
        match (self.bid_price, self.ask_price) {
            (Some(b), Some(a)) => Some((b + a) / 2.0),
            _ => Some(self.last_price),
        }
    }

    pub fn spread(&self) -> Option<f64> {
        match (self.bid_price, self.ask_price) {
            (Some(b), Some(a)) => Some(a - b),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Trade {
    pub symbol: String,
    pub exchange: String,
    pub trade_id: String,
    pub price: f64,
    pub quantity: f64,
    pub side: Option<String>,
    pub is_buyer_maker: Option<bool>,
    pub ts_ns: i64,
}

/// A single (price, size) book level.
pub type PriceLevel = (f64, f64);

#[derive(Debug, Clone, Default)]
pub struct OrderBook {
    pub symbol: String,
    pub exchange: String,
    /// Sorted highest-first.
    pub bids: Vec<PriceLevel>,
    /// Sorted lowest-first.
    pub asks: Vec<PriceLevel>,
    pub is_snapshot: bool,
    pub last_update_id: u64,
    pub ts_ns: i64,
}

impl OrderBook {
    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.bids.first().copied()
    }

    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.asks.first().copied()
    }

    pub fn mid_price(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(b), Some(a)) => Some((b.0 + a.0) / 2.0),
            _ => None,
        }
    }

    pub fn spread(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(b), Some(a)) => Some(a.0 - b.0),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Kline {
    pub symbol: String,
    pub exchange: String,
    pub interval: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub turnover: Option<f64>,
    pub is_closed: bool,
    pub ts_ns: i64,
}
