//! Block chain reconstruction.
//!
//! A channel's data lives in blocks scattered through the file. Every block
//! starts with a 20-byte record holding a link to the preceding block, a link
//! to the following block, its time range, channel number and item count.
//! The channel header only knows where the first and last block are and how
//! many blocks there should be.

use std::collections::HashSet;
use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, trace, warn};

use crate::error::{Result, SmrError};
use crate::header::open_file;
use crate::types::{BlockDescriptor, ChannelHeader};
use crate::utils::file_offset;

/// Raw 20-byte block record as stored in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockRecord {
    /// Offset of the preceding block, -1 for the first.
    pub pred_block: i32,
    /// Offset of the following block, -1 for the last.
    pub succ_block: i32,
    pub start_time: i32,
    pub end_time: i32,
    pub channel: i16,
    pub items: u16,
}

impl BlockRecord {
    pub(crate) fn read<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(BlockRecord {
            pred_block: reader.read_i32::<LittleEndian>()?,
            succ_block: reader.read_i32::<LittleEndian>()?,
            start_time: reader.read_i32::<LittleEndian>()?,
            end_time: reader.read_i32::<LittleEndian>()?,
            channel: reader.read_i16::<LittleEndian>()?,
            items: reader.read_u16::<LittleEndian>()?,
        })
    }
}

/// Reads the block chain of a channel in forward order.
///
/// # Errors
///
/// * `SmrError::NoData` - the channel has no first block
/// * `SmrError::CorruptBlockChain` - links end before `nblock` blocks were read,
///   or lead back to a block already visited
/// * `SmrError::FileNotFound` / `SmrError::Io` - the file cannot be read
pub fn read_block_chain(channel: &ChannelHeader) -> Result<Vec<BlockDescriptor>> {
    if !channel.has_data() {
        return Err(no_data(channel));
    }
    let mut reader = open_file(&channel.path)?;
    reconstruct_chain(&mut reader, channel)
}

fn no_data(channel: &ChannelHeader) -> SmrError {
    SmrError::NoData {
        index: channel.index,
        title: channel.title_str().to_string(),
    }
}

fn corrupt(channel: &ChannelHeader, reason: String) -> SmrError {
    SmrError::CorruptBlockChain {
        index: channel.index,
        reason,
    }
}

pub(crate) fn reconstruct_chain<R: Read + Seek>(
    reader: &mut R,
    channel: &ChannelHeader,
) -> Result<Vec<BlockDescriptor>> {
    let first_offset = file_offset(channel.first_block).ok_or_else(|| no_data(channel))?;

    reader.seek(SeekFrom::Start(first_offset))?;
    let first = BlockRecord::read(reader)?;

    if first.succ_block == -1 {
        debug!("channel {}: single block at {}", channel.index, first_offset);
        return Ok(vec![descriptor(first_offset, &first)]);
    }

    let nblock = usize::try_from(channel.nblock).unwrap_or(0);
    if nblock < 2 {
        return Err(corrupt(
            channel,
            format!("first block links onward but {} blocks are declared", channel.nblock),
        ));
    }

    // 沿后继链接读取记录；read_at 保存每条记录的实际读取位置，用于校验传递的偏移量
    let mut records = Vec::with_capacity(nblock);
    let mut read_at = Vec::with_capacity(nblock);
    let mut visited = HashSet::with_capacity(nblock);
    let mut offsets = vec![0u64; nblock];
    records.push(first);
    read_at.push(first_offset);
    visited.insert(first_offset);

    for k in 1..nblock {
        let link = records[k - 1].succ_block;
        let position = file_offset(link).ok_or_else(|| {
            corrupt(
                channel,
                format!("chain ends after {} of {} blocks", k, nblock),
            )
        })?;
        if !visited.insert(position) {
            return Err(corrupt(
                channel,
                format!("block {} links back to {}", k - 1, position),
            ));
        }

        reader.seek(SeekFrom::Start(position))?;
        let record = BlockRecord::read(reader)?;
        trace!(
            "channel {}: block {} at {} ({} items, ticks {}..{})",
            channel.index,
            k,
            position,
            record.items,
            record.start_time,
            record.end_time
        );

        // 块自身的偏移量只能从下一块的前驱链接得知
        offsets[k - 1] = file_offset(record.pred_block).ok_or_else(|| {
            corrupt(channel, format!("block {} has no predecessor link", k))
        })?;
        records.push(record);
        read_at.push(position);
    }

    offsets[nblock - 1] = file_offset(records[nblock - 2].succ_block).ok_or_else(|| {
        corrupt(channel, "last block has no offset".to_string())
    })?;

    for (k, (&offset, &position)) in offsets.iter().zip(read_at.iter()).enumerate() {
        if offset != position {
            warn!(
                "channel {}: block {} links to {} but was read at {}",
                channel.index, k, offset, position
            );
        }
    }

    debug!(
        "channel {}: reconstructed {} blocks from {}",
        channel.index, nblock, first_offset
    );

    Ok(records
        .iter()
        .zip(offsets)
        .map(|(record, offset)| descriptor(offset, record))
        .collect())
}

fn descriptor(storage_offset: u64, record: &BlockRecord) -> BlockDescriptor {
    BlockDescriptor {
        storage_offset,
        next_storage_offset: file_offset(record.succ_block),
        start_time: record.start_time,
        end_time: record.end_time,
        index: record.channel,
        item_count: record.items,
    }
}
