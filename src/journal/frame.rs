//! Frame header and per-kind payload schemas
//!
//! Grounded on `journal_writer.h`'s `FrameHeader`/`TickerFrame`/`OrderFrame`
//! schemas; `TradeFrame`/`KlineFrame` are a [SUPPLEMENT] bringing the
//! journal's msg_type catalog in line with `MarketEvent::kind` (the
//! retrieved source only persists tickers and orders).

/// Maximum inline symbol length carried in a frame (matches the C++
/// source's `char symbol[16]` field).
pub const SYMBOL_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MsgType {
    Ticker = 1,
    Trade = 2,
    Kline = 3,
    Order = 4,
}

impl MsgType {
    pub fn from_u32(v: u32) -> Option<Self> {
        match v {
            1 => Some(Self::Ticker),
            2 => Some(Self::Trade),
            3 => Some(Self::Kline),
            4 => Some(Self::Order),
            _ => None,
        }
    }
}

/// Frame header preceding every payload. `length` covers the payload only
/// and excludes this header.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct FrameHeader {
    pub length: u32,
    pub msg_type: u32,
    pub gen_time_ns: i64,
    pub trigger_time_ns: i64,
    pub source: u32,
    pub dest: u32,
}

pub const FRAME_HEADER_SIZE: usize = std::mem::size_of::<FrameHeader>();

fn symbol_buf(symbol: &str) -> [u8; SYMBOL_LEN] {
    let mut buf = [0u8; SYMBOL_LEN];
    let len = symbol.len().min(SYMBOL_LEN - 1);
    buf[..len].copy_from_slice(&symbol.as_bytes()[..len]);
    buf
}

fn symbol_str(buf: &[u8; SYMBOL_LEN]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(SYMBOL_LEN);
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct TickerFrame {
    pub symbol: [u8; SYMBOL_LEN],
    pub last_price: f64,
    pub bid_price: f64,
    pub ask_price: f64,
    pub volume: f64,
    pub venue_id: u8,
}

impl TickerFrame {
    pub fn new(symbol: &str, last_price: f64, bid_price: f64, ask_price: f64, volume: f64, venue_id: u8) -> Self {
        Self { symbol: symbol_buf(symbol), last_price, bid_price, ask_price, volume, venue_id }
    }

    pub fn symbol(&self) -> String {
        symbol_str(&self.symbol)
    }
}

#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct TradeFrame {
    pub symbol: [u8; SYMBOL_LEN],
    pub price: f64,
    pub quantity: f64,
    pub is_buyer_maker: bool,
    pub trade_id: u64,
    pub venue_id: u8,
}

impl TradeFrame {
    pub fn new(symbol: &str, price: f64, quantity: f64, is_buyer_maker: bool, trade_id: u64, venue_id: u8) -> Self {
        Self { symbol: symbol_buf(symbol), price, quantity, is_buyer_maker, trade_id, venue_id }
    }

    pub fn symbol(&self) -> String {
        symbol_str(&self.symbol)
    }
}

#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct KlineFrame {
    pub symbol: [u8; SYMBOL_LEN],
    pub interval: [u8; 8],
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub is_closed: bool,
    pub venue_id: u8,
}

impl KlineFrame {
    pub fn new(symbol: &str, interval: &str, open: f64, high: f64, low: f64, close: f64, volume: f64, is_closed: bool, venue_id: u8) -> Self {
        let mut interval_buf = [0u8; 8];
        let len = interval.len().min(8);
        interval_buf[..len].copy_from_slice(&interval.as_bytes()[..len]);
        Self { symbol: symbol_buf(symbol), interval: interval_buf, open, high, low, close, volume, is_closed, venue_id }
    }

    pub fn symbol(&self) -> String {
        symbol_str(&self.symbol)
    }
}

#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct OrderFrame {
    pub symbol: [u8; SYMBOL_LEN],
    pub order_id: u64,
    pub side: u32,
    pub order_type: u32,
    pub price: f64,
    pub quantity: f64,
    pub state: u8,
}

impl OrderFrame {
    pub fn new(symbol: &str, order_id: u64, side: u32, order_type: u32, price: f64, quantity: f64, state: u8) -> Self {
        Self { symbol: symbol_buf(symbol), order_id, side, order_type, price, quantity, state }
    }

    pub fn symbol(&self) -> String {
        symbol_str(&self.symbol)
    }
}

/// Parsed journal record handed to a reader's poll handler.
#[derive(Debug, Clone, Copy)]
pub enum JournalRecord {
    Ticker(TickerFrame),
    Trade(TradeFrame),
    Kline(KlineFrame),
    Order(OrderFrame),
}
