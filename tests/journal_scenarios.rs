//! Journal cross-module scenario: a reader started mid-stream only sees
//! what the writer has already published, then catches up incrementally.

use sable_gateway::journal::{ JournalReader, JournalRecord, JournalWriter };
use sable_gateway::model::symbol::VenueId;
use tempfile::tempdir;

#[test]
fn scenario_journal_tail_observes_only_committed_prefix() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scenario.journal");

    let mut writer = JournalWriter::create(&path, 1 << 20).unwrap();
    for i in 0..50u32 {
        writer.write_ticker("BTCUSDT", 100.0 + i as f64, 99.5, 100.5, 1.0, VenueId::Binance as u8);
    }

    // Reader opened after the writer has published `write_cursor = W`
    // observes exactly the frames at offsets < W.
    let mut reader = JournalReader::open(&path).unwrap();
    let mut first_batch = Vec::new();
    reader
        .poll(|record| {
            if let JournalRecord::Ticker(t) = record {
                first_batch.push(t.last_price);
            }
        })
        .unwrap();
    assert_eq!(first_batch.len(), 50);

    // Nothing new until the writer commits more frames.
    let mut empty_batch = Vec::new();
    reader.poll(|_| empty_batch.push(())).unwrap();
    assert!(empty_batch.is_empty());

    for i in 50..75u32 {
        writer.write_ticker("BTCUSDT", 100.0 + i as f64, 99.5, 100.5, 1.0, VenueId::Binance as u8);
    }

    let mut second_batch = Vec::new();
    reader
        .poll(|record| {
            if let JournalRecord::Ticker(t) = record {
                second_batch.push(t.last_price);
            }
        })
        .unwrap();
    assert_eq!(second_batch.len(), 25);
}

#[test]
fn scenario_journal_idempotent_reread_from_zero() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scenario_idempotent.journal");

    let mut writer = JournalWriter::create(&path, 1 << 20).unwrap();
    for i in 0..30u32 {
        writer.write_trade("ETHUSDT", 2000.0 + i as f64, 0.5, i % 2 == 0, i as u64, VenueId::Okx as u8);
    }
    drop(writer);

    let read_all = || {
        let mut reader = JournalReader::open(&path).unwrap();
        let mut ids = Vec::new();
        reader
            .poll(|record| {
                if let JournalRecord::Trade(t) = record {
                    ids.push(t.trade_id);
                }
            })
            .unwrap();
        ids
    };

    assert_eq!(read_all(), read_all());
    assert_eq!(read_all().len(), 30);
}
