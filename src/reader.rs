use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use log::debug;

use crate::blocks::read_block_chain;
use crate::error::{Result, SmrError};
use crate::header::{open_file, read_channel_header, read_file_header};
use crate::types::{
    BlockDescriptor, ChannelHeader, ChannelKind, ContinuousChannel, EventChannel, FileHeader,
    MarkerChannel, WavemarkChannel,
};
use crate::{MARKER_SIZE, MICROSECONDS};

/// Sample interval of channel `index` in microseconds.
///
/// Only continuous, wavemark, real marker and real wave channels are sampled
/// at a fixed rate.
///
/// # Errors
///
/// * `SmrError::NoSampleInterval` - the channel kind has no sample interval
/// * `SmrError::ChannelOutOfRange` - `index` is outside `1..=nchannel`
pub fn sample_interval(file_header: &FileHeader, index: usize) -> Result<f64> {
    let channel = read_channel_header(file_header, index)?;
    channel_sample_interval(file_header, &channel)
}

/// Sampling rate of channel `index` in Hz.
pub fn sampling_rate(file_header: &FileHeader, index: usize) -> Result<f64> {
    Ok(MICROSECONDS / sample_interval(file_header, index)?)
}

pub(crate) fn channel_sample_interval(file_header: &FileHeader, channel: &ChannelHeader) -> Result<f64> {
    if !channel.kind.has_sample_interval() {
        return Err(SmrError::NoSampleInterval {
            index: channel.index,
            kind: channel.kind,
        });
    }

    let uspertime = file_header.uspertime as f64;
    let interval = if file_header.system_id < 6 {
        channel.divide() as f64 * uspertime * file_header.timeperadc as f64
    } else {
        channel.l_chan_dvd as f64 * uspertime * file_header.dtimebase * MICROSECONDS
    };
    Ok(interval)
}

fn expect_kind(
    channel: &ChannelHeader,
    expected: &'static str,
    accepts: impl Fn(ChannelKind) -> bool,
) -> Result<()> {
    if accepts(channel.kind) {
        Ok(())
    } else {
        Err(SmrError::WrongChannelKind {
            index: channel.index,
            expected,
            found: channel.kind,
        })
    }
}

fn total_items(chain: &[BlockDescriptor]) -> usize {
    chain.iter().map(|block| block.item_count as usize).sum()
}

/// Number of sampling frames: consecutive blocks further apart than one
/// sample interval start a new frame.
fn count_frames(chain: &[BlockDescriptor], interval: f64) -> usize {
    let gaps = chain
        .windows(2)
        .filter(|pair| (pair[1].start_time as i64 - pair[0].end_time as i64) as f64 > interval)
        .count();
    1 + gaps
}

fn extra_bytes(channel: &ChannelHeader) -> usize {
    usize::try_from(channel.nextra).unwrap_or(0)
}

/// Reads all samples of a continuous channel.
///
/// # Examples
///
/// ```rust,no_run
/// let channel = smrfile::read_continuous_channel("recording.smr", 1)?;
/// println!("{} samples at {:.1} Hz", channel.len(), channel.sampling_rate);
/// # Ok::<(), smrfile::SmrError>(())
/// ```
///
/// # Errors
///
/// * `SmrError::WrongChannelKind` - the channel is not continuous
/// * `SmrError::NoData` - the channel has no blocks
/// * `SmrError::TriggeredSampling` - blocks are not contiguous in time
pub fn read_continuous_channel<P: AsRef<Path>>(path: P, index: usize) -> Result<ContinuousChannel> {
    let file_header = read_file_header(path)?;
    let channel = read_channel_header(&file_header, index)?;
    read_continuous_channel_from_header(&file_header, &channel)
}

/// Reads a continuous channel from already decoded headers.
pub fn read_continuous_channel_from_header(
    file_header: &FileHeader,
    channel: &ChannelHeader,
) -> Result<ContinuousChannel> {
    expect_kind(channel, "continuous", |kind| kind == ChannelKind::Continuous)?;

    let interval = channel_sample_interval(file_header, channel)?;
    let chain = read_block_chain(channel)?;

    let frames = count_frames(&chain, interval);
    if frames > 1 {
        return Err(SmrError::TriggeredSampling {
            index: channel.index,
            frames,
        });
    }

    let mut reader = open_file(&channel.path)?;
    let mut data = vec![0i16; total_items(&chain)];
    let mut filled = 0;

    for block in &chain {
        let count = block.item_count as usize;
        reader.seek(SeekFrom::Start(block.payload_offset()))?;
        reader.read_i16_into::<LittleEndian>(&mut data[filled..filled + count])?;
        filled += count;
    }

    let sampling_rate = MICROSECONDS / interval;
    debug!(
        "channel {}: {} samples in {} blocks at {} Hz",
        channel.index,
        data.len(),
        chain.len(),
        sampling_rate
    );

    Ok(ContinuousChannel {
        data,
        sampling_rate,
        scale: channel.scale(),
        offset: channel.offset(),
        units: channel.units().map(str::to_string),
    })
}

/// Reads the event times of an event channel, in seconds.
pub fn read_event_channel<P: AsRef<Path>>(path: P, index: usize) -> Result<EventChannel> {
    let file_header = read_file_header(path)?;
    let channel = read_channel_header(&file_header, index)?;
    expect_kind(&channel, "event", ChannelKind::is_event)?;

    let chain = read_block_chain(&channel)?;
    let mut reader = open_file(&channel.path)?;
    let mut ticks = vec![0i32; total_items(&chain)];
    let mut filled = 0;

    for block in &chain {
        let count = block.item_count as usize;
        reader.seek(SeekFrom::Start(block.payload_offset()))?;
        reader.read_i32_into::<LittleEndian>(&mut ticks[filled..filled + count])?;
        filled += count;
    }

    let data: Vec<f64> = ticks
        .into_iter()
        .map(|t| file_header.ticks_to_seconds(t))
        .collect();
    debug!("channel {}: {} events", channel.index, data.len());

    Ok(EventChannel { data })
}

fn read_marker_code<R: Read>(reader: &mut R) -> Result<[u8; MARKER_SIZE]> {
    let mut code = [0u8; MARKER_SIZE];
    reader.read_exact(&mut code)?;
    Ok(code)
}

/// Reads a marker or text marker channel.
///
/// Plain markers carry no text; their text buffer holds one zero byte per
/// marker.
pub fn read_marker_channel<P: AsRef<Path>>(path: P, index: usize) -> Result<MarkerChannel> {
    let file_header = read_file_header(path)?;
    let channel = read_channel_header(&file_header, index)?;
    expect_kind(&channel, "marker", ChannelKind::is_marker)?;

    let has_text = channel.kind == ChannelKind::TextMarker;
    let chain = read_block_chain(&channel)?;
    let length = total_items(&chain);
    let npt = if has_text { extra_bytes(&channel) } else { 1 };

    let mut reader = open_file(&channel.path)?;
    let mut timestamps = Vec::with_capacity(length);
    let mut markers = Vec::with_capacity(length);
    let mut text = vec![0u8; length * npt];
    let mut item = 0;

    for block in &chain {
        reader.seek(SeekFrom::Start(block.payload_offset()))?;
        for _ in 0..block.item_count {
            let ticks = reader.read_i32::<LittleEndian>()?;
            markers.push(read_marker_code(&mut reader)?);
            if has_text {
                reader.read_exact(&mut text[item * npt..(item + 1) * npt])?;
            }
            timestamps.push(file_header.ticks_to_seconds(ticks));
            item += 1;
        }
    }

    debug!(
        "channel {}: {} markers, {} text bytes each",
        channel.index, length, npt
    );

    Ok(MarkerChannel {
        timestamps,
        markers,
        text,
        npt,
    })
}

/// Reads a wavemark channel: spike times, marker codes and waveform snippets.
pub fn read_wavemark_channel<P: AsRef<Path>>(path: P, index: usize) -> Result<WavemarkChannel> {
    let file_header = read_file_header(path)?;
    let channel = read_channel_header(&file_header, index)?;
    expect_kind(&channel, "wavemark", |kind| kind == ChannelKind::AdcMarker)?;

    let chain = read_block_chain(&channel)?;
    let length = total_items(&chain);
    let points_per_spike = extra_bytes(&channel) / std::mem::size_of::<i16>();

    let mut reader = open_file(&channel.path)?;
    let mut timestamps = Vec::with_capacity(length);
    let mut markers = Vec::with_capacity(length);
    let mut wavemarks = vec![0i16; length * points_per_spike];
    let mut item = 0;

    for block in &chain {
        reader.seek(SeekFrom::Start(block.payload_offset()))?;
        for _ in 0..block.item_count {
            let ticks = reader.read_i32::<LittleEndian>()?;
            markers.push(read_marker_code(&mut reader)?);
            let start = item * points_per_spike;
            reader.read_i16_into::<LittleEndian>(&mut wavemarks[start..start + points_per_spike])?;
            timestamps.push(file_header.ticks_to_seconds(ticks));
            item += 1;
        }
    }

    debug!(
        "channel {}: {} spikes of {} points",
        channel.index, length, points_per_spike
    );

    Ok(WavemarkChannel {
        timestamps,
        markers,
        wavemarks,
        points_per_spike,
    })
}

impl FileHeader {
    /// Sample interval of channel `index` in microseconds.
    pub fn sample_interval(&self, index: usize) -> Result<f64> {
        sample_interval(self, index)
    }

    /// Sampling rate of channel `index` in Hz.
    pub fn sampling_rate(&self, index: usize) -> Result<f64> {
        sampling_rate(self, index)
    }
}
