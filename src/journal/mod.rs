//! Memory-mapped append-only journal
//!
//! A single-writer, many-reader durable log of every event that crosses
//! the `RingBus`. Grounded on the original `journal_writer.h`'s mmap +
//! `PageHeader` + `FrameHeader` layout, and on the pack's raw-atomics-in-mmap
//! idiom (`crates-shm/src/ring_buffer.rs`'s `ProducerState`/`ConsumerState`
//! embedded directly in a `memmap2::MmapMut` region) rather than a hand
//! rolled shared-memory primitive.
//!
//! `write_cursor` is the only synchronization primitive: the writer stores
//! it with `Release` ordering after a frame's bytes are fully written; a
//! tailer loads it with `Acquire` before parsing anything at or past its
//! old position. No locks, no syscalls on the read path.

mod frame;
mod reader;
mod writer;

pub use frame::{ FrameHeader, JournalRecord, KlineFrame, MsgType, OrderFrame, TickerFrame, TradeFrame };
pub use reader::JournalReader;
pub use writer::JournalWriter;

use std::sync::atomic::AtomicU32;

/// Cache-line-aligned page header. Lives at offset 0 of the mmap'd file;
/// the frame arena starts at `HEADER_SIZE`.
#[repr(C)]
pub(crate) struct PageHeader {
    pub capacity: u32,
    pub version: u16,
    _reserved0: u16,
    pub write_cursor: AtomicU32,
    pub read_cursor: AtomicU32,
    _reserved: [u8; 48],
}

/// Size of `PageHeader` in bytes; fixed independent of target so the wire
/// layout never drifts across builds.
pub const HEADER_SIZE: usize = 64;

/// Current journal wire-format version.
pub const JOURNAL_VERSION: u16 = crate::constants::JOURNAL_VERSION;

static_assertions::const_assert_eq!(std::mem::size_of::<PageHeader>(), HEADER_SIZE);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::symbol::VenueId;
    use tempfile::tempdir;

    #[test]
    fn test_round_trip_after_writer_finishes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("journal.bin");
        let mut writer = JournalWriter::create(&path, 1 << 20).unwrap();
        for i in 0..1000u32 {
            let price = 50000.0 + i as f64;
            assert!(writer.write_ticker("BTCUSDT", price, price - 0.5, price + 0.5, 1.0, VenueId::Binance as u8));
        }
        drop(writer);

        let mut reader = JournalReader::open(&path).unwrap();
        let mut prices = Vec::new();
        reader
            .poll(|record| {
                if let JournalRecord::Ticker(t) = record {
                    prices.push(t.last_price);
                }
            })
            .unwrap();
        assert_eq!(prices.len(), 1000);
        for pair in prices.windows(2) {
            assert_eq!(pair[1] - pair[0], 1.0);
        }
    }

    #[test]
    fn test_tail_observes_only_whats_committed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("journal.bin");
        let mut writer = JournalWriter::create(&path, 1 << 20).unwrap();
        writer.write_ticker("BTCUSDT", 1.0, 1.0, 1.0, 1.0, 1);
        writer.write_ticker("BTCUSDT", 2.0, 2.0, 2.0, 2.0, 1);

        let mut reader = JournalReader::open(&path).unwrap();
        let mut seen = Vec::new();
        reader
            .poll(|record| {
                if let JournalRecord::Ticker(t) = record {
                    seen.push(t.last_price);
                }
            })
            .unwrap();
        assert_eq!(seen, vec![1.0, 2.0]);

        // Nothing new since the last poll.
        let mut seen2 = Vec::new();
        reader.poll(|_| seen2.push(())).unwrap();
        assert!(seen2.is_empty());

        writer.write_ticker("BTCUSDT", 3.0, 3.0, 3.0, 3.0, 1);
        let mut seen3 = Vec::new();
        reader
            .poll(|record| {
                if let JournalRecord::Ticker(t) = record {
                    seen3.push(t.last_price);
                }
            })
            .unwrap();
        assert_eq!(seen3, vec![3.0]);
    }

    #[test]
    fn test_idempotent_reread_from_zero() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("journal.bin");
        let mut writer = JournalWriter::create(&path, 1 << 20).unwrap();
        for i in 0..10u32 {
            writer.write_trade("ETHUSDT", 2000.0 + i as f64, 0.1, true, i as u64, 1);
        }
        drop(writer);

        let collect = || {
            let mut reader = JournalReader::open(&path).unwrap();
            let mut out = Vec::new();
            reader
                .poll(|record| {
                    if let JournalRecord::Trade(t) = record {
                        out.push(t.trade_id);
                    }
                })
                .unwrap();
            out
        };
        assert_eq!(collect(), collect());
    }

    #[test]
    fn test_page_full_halts_writer() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("journal.bin");
        // Page barely larger than the header; first ticker frame should fail.
        let mut writer = JournalWriter::create(&path, HEADER_SIZE + 8).unwrap();
        assert!(!writer.write_ticker("BTCUSDT", 1.0, 1.0, 1.0, 1.0, 1));
        assert_eq!(writer.stats().page_full_count, 1);
    }
}
