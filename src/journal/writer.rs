//! Single-writer side of the journal
//!
//! Grounded on `journal_writer.h`: open/create the backing file, `mmap`
//! `MAP_SHARED`, `madvise(MADV_HUGEPAGE)` best-effort, then append frames by
//! writing directly into the mapped bytes and publishing the new
//! `write_cursor` with `Release` ordering.

use super::frame::{ FrameHeader, KlineFrame, OrderFrame, TickerFrame, TradeFrame, FRAME_HEADER_SIZE };
use super::{ PageHeader, HEADER_SIZE, JOURNAL_VERSION };
use crate::error::{ GatewayError, Result };
use crate::model::event::now_ns;
use memmap2::MmapMut;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::atomic::Ordering;

/// Running counters for journal health, exposed via `JournalWriter::stats`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JournalStats {
    pub frames_written: u64,
    pub page_full_count: u64,
}

pub struct JournalWriter {
    mmap: MmapMut,
    capacity: usize,
    stats: JournalStats,
}

impl JournalWriter {
    /// Create (or truncate) the backing file at `path` to exactly
    /// `page_size` bytes and initialize a fresh `PageHeader`.
    pub fn create(path: impl AsRef<Path>, page_size: usize) -> Result<Self> {
        if page_size < HEADER_SIZE {
            return Err(GatewayError::config("journal page_size must be larger than the page header"));
        }
        let file = OpenOptions::new().read(true).write(true).create(true).truncate(true).open(path)?;
        file.set_len(page_size as u64)?;
        let mut mmap = unsafe { MmapMut::map_mut(&file)? };

        #[cfg(target_os = "linux")]
        {
            let _ = mmap.advise(memmap2::Advice::HugePage);
        }

        // SAFETY: the mapping is exactly `page_size` bytes and `page_size
        // >= HEADER_SIZE`; the base address is page-aligned, which
        // satisfies `PageHeader`'s atomic fields' alignment requirements.
        unsafe {
            let header = mmap.as_mut_ptr() as *mut PageHeader;
            (*header).capacity = page_size as u32;
            (*header).version = JOURNAL_VERSION;
            (*header).write_cursor = std::sync::atomic::AtomicU32::new(HEADER_SIZE as u32);
            (*header).read_cursor = std::sync::atomic::AtomicU32::new(HEADER_SIZE as u32);
        }

        Ok(Self { mmap, capacity: page_size, stats: JournalStats::default() })
    }

    fn header(&self) -> &PageHeader {
        // SAFETY: constructed by `create`, which guarantees the mapping is
        // large enough and aligned for `PageHeader`.
        unsafe { &*(self.mmap.as_ptr() as *const PageHeader) }
    }

    pub fn write_cursor(&self) -> u32 {
        self.header().write_cursor.load(Ordering::Acquire)
    }

    pub fn stats(&self) -> JournalStats {
        self.stats
    }

    /// Append a frame: header + payload, laid out in-place in the mmap'd
    /// bytes, then publish by storing the advanced cursor with Release.
    /// Returns false (and increments `page_full_count`) if the frame would
    /// overrun the page; the writer halts, rotation is the caller's choice.
    fn write_frame<T: Copy>(&mut self, msg_type: u32, payload: &T) -> bool {
        let payload_len = std::mem::size_of::<T>();
        let frame_len = FRAME_HEADER_SIZE + payload_len;
        let curr = self.header().write_cursor.load(Ordering::Relaxed) as usize;

        if curr + frame_len > self.capacity {
            self.stats.page_full_count += 1;
            return false;
        }

        let header = FrameHeader {
            length: payload_len as u32,
            msg_type,
            gen_time_ns: now_ns(),
            trigger_time_ns: 0,
            source: 0,
            dest: 0,
        };

        // SAFETY: bounds were just checked; writes are unaligned so no
        // alignment precondition on `curr` is required. The frame is
        // written directly into the mapped bytes that a tailer will later
        // read, with no IPC in between.
        unsafe {
            let base = self.mmap.as_mut_ptr();
            (base.add(curr) as *mut FrameHeader).write_unaligned(header);
            (base.add(curr + FRAME_HEADER_SIZE) as *mut T).write_unaligned(*payload);
        }

        self.header().write_cursor.store((curr + frame_len) as u32, Ordering::Release);
        self.stats.frames_written += 1;
        true
    }

    pub fn write_ticker(&mut self, symbol: &str, last_price: f64, bid_price: f64, ask_price: f64, volume: f64, venue_id: u8) -> bool {
        let payload = TickerFrame::new(symbol, last_price, bid_price, ask_price, volume, venue_id);
        self.write_frame(super::frame::MsgType::Ticker as u32, &payload)
    }

    pub fn write_trade(&mut self, symbol: &str, price: f64, quantity: f64, is_buyer_maker: bool, trade_id: u64, venue_id: u8) -> bool {
        let payload = TradeFrame::new(symbol, price, quantity, is_buyer_maker, trade_id, venue_id);
        self.write_frame(super::frame::MsgType::Trade as u32, &payload)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn write_kline(&mut self, symbol: &str, interval: &str, open: f64, high: f64, low: f64, close: f64, volume: f64, is_closed: bool, venue_id: u8) -> bool {
        let payload = KlineFrame::new(symbol, interval, open, high, low, close, volume, is_closed, venue_id);
        self.write_frame(super::frame::MsgType::Kline as u32, &payload)
    }

    pub fn write_order(&mut self, symbol: &str, order_id: u64, side: u32, order_type: u32, price: f64, quantity: f64, state: u8) -> bool {
        let payload = OrderFrame::new(symbol, order_id, side, order_type, price, quantity, state);
        self.write_frame(super::frame::MsgType::Order as u32, &payload)
    }
}

impl Drop for JournalWriter {
    fn drop(&mut self) {
        // msync: flush to durable storage. In-flight writes before this
        // point do not survive a kernel crash, only an orderly process exit.
        if let Err(err) = self.mmap.flush() {
            tracing::error!(error = %err, "journal msync failed on drop");
        }
    }
}
