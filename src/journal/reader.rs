//! Many-reader tailing side of the journal
//!
//! Opens the same file read-only and mmaps it; `poll` is the entire read
//! protocol: load `write_cursor` with Acquire, then parse frames up to
//! that point with no locks and no further system calls.

use super::frame::{ FrameHeader, JournalRecord, KlineFrame, MsgType, OrderFrame, TickerFrame, TradeFrame, FRAME_HEADER_SIZE };
use super::{ PageHeader, HEADER_SIZE };
use crate::error::{ GatewayError, Result };
use memmap2::Mmap;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::atomic::Ordering;

pub struct JournalReader {
    mmap: Mmap,
    local_cursor: u32,
}

impl JournalReader {
    /// Open the journal file read-only, starting the tail at the header
    /// boundary (i.e. replay from the beginning of the frame arena).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new().read(true).open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        if mmap.len() < HEADER_SIZE {
            return Err(GatewayError::corrupt_frame(0, "journal file smaller than page header"));
        }
        Ok(Self { mmap, local_cursor: HEADER_SIZE as u32 })
    }

    fn header(&self) -> &PageHeader {
        // SAFETY: `open` checked the mapping is at least HEADER_SIZE bytes.
        unsafe { &*(self.mmap.as_ptr() as *const PageHeader) }
    }

    pub fn write_cursor(&self) -> u32 {
        self.header().write_cursor.load(Ordering::Acquire)
    }

    /// Drain every frame committed since the last call, invoking `handler`
    /// on each in commit order. Stops (and returns an error) on the first
    /// frame whose length would read past the committed cursor or the page
    /// capacity, a corrupt-length guard against torn or malformed frames.
    pub fn poll(&mut self, mut handler: impl FnMut(JournalRecord)) -> Result<usize> {
        let write_cursor = self.header().write_cursor.load(Ordering::Acquire);
        let capacity = self.mmap.len() as u32;
        let mut processed = 0;

        while self.local_cursor < write_cursor {
            let offset = self.local_cursor as usize;
            if offset + FRAME_HEADER_SIZE > capacity as usize {
                return Err(GatewayError::corrupt_frame(offset as u64, "frame header overruns page"));
            }

            // SAFETY: bound-checked above; unaligned read matches the
            // writer's unaligned write.
            let frame_header: FrameHeader = unsafe { (self.mmap.as_ptr().add(offset) as *const FrameHeader).read_unaligned() };
            let payload_offset = offset + FRAME_HEADER_SIZE;
            let frame_end = payload_offset as u64 + frame_header.length as u64;

            if frame_end > write_cursor as u64 || frame_end > capacity as u64 {
                return Err(GatewayError::corrupt_frame(offset as u64, "frame length overruns committed cursor"));
            }

            let Some(msg_type) = MsgType::from_u32(frame_header.msg_type) else {
                return Err(GatewayError::corrupt_frame(offset as u64, "unknown msg_type"));
            };

            let record = unsafe { self.parse_payload(msg_type, payload_offset, frame_header.length as usize)? };
            handler(record);
            self.local_cursor = frame_end as u32;
            processed += 1;
        }

        Ok(processed)
    }

    /// # Safety
    /// `offset..offset+len` must already be bound-checked against the
    /// mapping and against `write_cursor`.
    unsafe fn parse_payload(&self, msg_type: MsgType, offset: usize, len: usize) -> Result<JournalRecord> {
        let base = self.mmap.as_ptr();
        match msg_type {
            MsgType::Ticker => {
                check_len::<TickerFrame>(offset, len)?;
                let frame: TickerFrame = unsafe { (base.add(offset) as *const TickerFrame).read_unaligned() };
                Ok(JournalRecord::Ticker(frame))
            }
            MsgType::Trade => {
                check_len::<TradeFrame>(offset, len)?;
                let frame: TradeFrame = unsafe { (base.add(offset) as *const TradeFrame).read_unaligned() };
                Ok(JournalRecord::Trade(frame))
            }
            MsgType::Kline => {
                check_len::<KlineFrame>(offset, len)?;
                let frame: KlineFrame = unsafe { (base.add(offset) as *const KlineFrame).read_unaligned() };
                Ok(JournalRecord::Kline(frame))
            }
            MsgType::Order => {
                check_len::<OrderFrame>(offset, len)?;
                let frame: OrderFrame = unsafe { (base.add(offset) as *const OrderFrame).read_unaligned() };
                Ok(JournalRecord::Order(frame))
            }
        }
    }
}

fn check_len<T>(offset: usize, len: usize) -> Result<()> {
    if len != std::mem::size_of::<T>() {
        return Err(GatewayError::corrupt_frame(offset as u64, "payload length does not match schema"));
    }
    Ok(())
}
