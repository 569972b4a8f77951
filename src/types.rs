use std::fmt;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};

use crate::{BLOCK_HEADER_SIZE, MARKER_SIZE};

/// Content encoding of a channel, stored as a single byte in its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Unused or deleted channel slot.
    Unused,
    Continuous,
    /// Event times on the falling edge.
    EventFalling,
    /// Event times on the rising edge.
    EventRising,
    /// Event times on both edges, with level information.
    EventBoth,
    Marker,
    /// Markers with an attached waveform snippet (wavemarks).
    AdcMarker,
    RealMarker,
    TextMarker,
    RealWave,
    /// Any kind byte this crate does not know about.
    Other(u8),
}

impl ChannelKind {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => ChannelKind::Unused,
            1 => ChannelKind::Continuous,
            2 => ChannelKind::EventFalling,
            3 => ChannelKind::EventRising,
            4 => ChannelKind::EventBoth,
            5 => ChannelKind::Marker,
            6 => ChannelKind::AdcMarker,
            7 => ChannelKind::RealMarker,
            8 => ChannelKind::TextMarker,
            9 => ChannelKind::RealWave,
            other => ChannelKind::Other(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            ChannelKind::Unused => 0,
            ChannelKind::Continuous => 1,
            ChannelKind::EventFalling => 2,
            ChannelKind::EventRising => 3,
            ChannelKind::EventBoth => 4,
            ChannelKind::Marker => 5,
            ChannelKind::AdcMarker => 6,
            ChannelKind::RealMarker => 7,
            ChannelKind::TextMarker => 8,
            ChannelKind::RealWave => 9,
            ChannelKind::Other(code) => code,
        }
    }

    pub fn is_event(self) -> bool {
        matches!(
            self,
            ChannelKind::EventFalling | ChannelKind::EventRising | ChannelKind::EventBoth
        )
    }

    pub fn is_marker(self) -> bool {
        matches!(self, ChannelKind::Marker | ChannelKind::TextMarker)
    }

    /// Kinds whose items are sampled at a fixed rate.
    pub fn has_sample_interval(self) -> bool {
        matches!(
            self,
            ChannelKind::Continuous
                | ChannelKind::AdcMarker
                | ChannelKind::RealMarker
                | ChannelKind::RealWave
        )
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChannelKind::Unused => "unused",
            ChannelKind::Continuous => "continuous",
            ChannelKind::EventFalling => "event-",
            ChannelKind::EventRising => "event+",
            ChannelKind::EventBoth => "level",
            ChannelKind::Marker => "marker",
            ChannelKind::AdcMarker => "wavemark",
            ChannelKind::RealMarker => "realmark",
            ChannelKind::TextMarker => "textmark",
            ChannelKind::RealWave => "realwave",
            ChannelKind::Other(code) => return write!(f, "unknown({})", code),
        };
        write!(f, "{} ({})", name, self.code())
    }
}

/// Sample rate divisor read at the end of the kind-specific header tail.
///
/// Files written by format versions before 6 store a `divide` value, later
/// versions reuse the slot as an `interleave` count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDivisor {
    Divide(i16),
    Interleave(i16),
}

/// Kind-specific fields at the end of a channel header.
#[derive(Debug, Clone, PartialEq)]
pub enum KindParams {
    /// Continuous and ADC marker channels.
    Adc {
        scale: f32,
        offset: f32,
        units: Option<String>,
        rate: RateDivisor,
    },
    /// Real marker and real wave channels.
    Real {
        min: f32,
        max: f32,
        units: Option<String>,
        rate: RateDivisor,
    },
    /// Event channels recording both edges.
    EventLevel { init_low: u8, next_low: u8 },
    None,
}

/// File-level header, the first 512 bytes of a file.
#[derive(Debug, Clone)]
pub struct FileHeader {
    /// File this header was read from; channel decoders reopen it.
    pub path: PathBuf,
    /// Format version.
    pub system_id: i16,
    pub copyright: String,
    pub creator: String,
    /// Microseconds per clock tick.
    pub uspertime: i16,
    /// Clock ticks per ADC conversion (format versions before 6).
    pub timeperadc: i16,
    pub filestate: i16,
    pub first_data: i32,
    pub nchannel: i16,
    pub chansize: i16,
    pub extra_data: i16,
    pub buffersize: i16,
    pub os_format: i16,
    pub max_time: i32,
    /// Seconds per time unit (format version 6 and later).
    pub dtimebase: f64,
    /// Hundredths, seconds, minutes, hours, day, month.
    pub time_detail: [u8; 6],
    pub time_year: i16,
    pub comments: [Option<String>; crate::COMMENT_COUNT],
}

impl FileHeader {
    /// Converts a raw tick count to seconds.
    pub fn ticks_to_seconds(&self, ticks: i32) -> f64 {
        ticks as f64 * self.uspertime as f64 * self.dtimebase
    }

    /// Wall clock time at which the recording was started, if the header
    /// carries a valid one.
    pub fn recorded_at(&self) -> Option<NaiveDateTime> {
        let [hundredths, sec, min, hour, day, month] = self.time_detail;
        NaiveDate::from_ymd_opt(self.time_year as i32, month as u32, day as u32)?
            .and_hms_milli_opt(hour as u32, min as u32, sec as u32, hundredths as u32 * 10)
    }
}

/// Per-channel header, one 140-byte slot after the file header.
#[derive(Debug, Clone)]
pub struct ChannelHeader {
    pub path: PathBuf,
    /// 1-based channel number.
    pub index: usize,
    pub del_size: i16,
    pub next_del_block: i32,
    /// Offset of the first data block, -1 if the channel holds no data.
    pub first_block: i32,
    /// Offset of the last data block.
    pub last_block: i32,
    pub nblock: i16,
    /// Bytes of extra data attached to each item.
    pub nextra: i16,
    pub pre_trig: i16,
    pub free0: i16,
    pub phy_sz: i16,
    pub max_data: i16,
    pub comment: Option<String>,
    pub max_chan_time: i32,
    /// Channel divide used for the sample interval from version 6 on.
    pub l_chan_dvd: i32,
    /// Physical port the channel was sampled from.
    pub phy_chan: i16,
    pub title: Option<String>,
    pub ideal_rate: f32,
    pub kind: ChannelKind,
    pub params: KindParams,
}

impl ChannelHeader {
    pub fn title_str(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn has_data(&self) -> bool {
        self.first_block != -1
    }

    pub fn scale(&self) -> f32 {
        match self.params {
            KindParams::Adc { scale, .. } => scale,
            _ => 0.0,
        }
    }

    pub fn offset(&self) -> f32 {
        match self.params {
            KindParams::Adc { offset, .. } => offset,
            _ => 0.0,
        }
    }

    pub fn min(&self) -> f32 {
        match self.params {
            KindParams::Real { min, .. } => min,
            _ => 0.0,
        }
    }

    pub fn max(&self) -> f32 {
        match self.params {
            KindParams::Real { max, .. } => max,
            _ => 0.0,
        }
    }

    pub fn units(&self) -> Option<&str> {
        match &self.params {
            KindParams::Adc { units, .. } | KindParams::Real { units, .. } => units.as_deref(),
            _ => None,
        }
    }

    fn rate(&self) -> Option<RateDivisor> {
        match self.params {
            KindParams::Adc { rate, .. } | KindParams::Real { rate, .. } => Some(rate),
            _ => None,
        }
    }

    pub fn divide(&self) -> i16 {
        match self.rate() {
            Some(RateDivisor::Divide(divide)) => divide,
            _ => 1,
        }
    }

    pub fn interleave(&self) -> i16 {
        match self.rate() {
            Some(RateDivisor::Interleave(interleave)) => interleave,
            _ => 1,
        }
    }

    pub fn init_low(&self) -> u8 {
        match self.params {
            KindParams::EventLevel { init_low, .. } => init_low,
            _ => 0,
        }
    }

    pub fn next_low(&self) -> u8 {
        match self.params {
            KindParams::EventLevel { next_low, .. } => next_low,
            _ => 0,
        }
    }
}

/// One data block of a channel, in forward chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDescriptor {
    /// Offset of the block record; its payload follows the 20-byte header.
    pub storage_offset: u64,
    /// Offset of the following block, `None` for the last one.
    pub next_storage_offset: Option<u64>,
    /// Raw ticks.
    pub start_time: i32,
    pub end_time: i32,
    pub index: i16,
    pub item_count: u16,
}

impl BlockDescriptor {
    pub fn payload_offset(&self) -> u64 {
        self.storage_offset + BLOCK_HEADER_SIZE
    }
}

/// Catalog entry for a channel in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSummary {
    pub label: String,
    pub index: usize,
    pub kind: ChannelKind,
    pub port: i16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContinuousChannel {
    /// Raw ADC samples in file order.
    pub data: Vec<i16>,
    /// Samples per second.
    pub sampling_rate: f64,
    pub scale: f32,
    pub offset: f32,
    pub units: Option<String>,
}

impl ContinuousChannel {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Converts a raw sample to physical units.
    pub fn to_physical(&self, raw: i16) -> f64 {
        raw as f64 * self.scale as f64 / 6553.6 + self.offset as f64
    }

    pub fn physical_samples(&self) -> Vec<f64> {
        self.data.iter().map(|&raw| self.to_physical(raw)).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventChannel {
    /// Event times in seconds.
    pub data: Vec<f64>,
}

impl EventChannel {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerChannel {
    pub timestamps: Vec<f64>,
    pub markers: Vec<[u8; MARKER_SIZE]>,
    /// Text bytes, `npt` per marker.
    pub text: Vec<u8>,
    /// Text bytes per marker; 1 for plain markers, whose text is a zero byte.
    pub npt: usize,
}

impl MarkerChannel {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn text(&self, item: usize) -> Option<&[u8]> {
        let start = item.checked_mul(self.npt)?;
        self.text.get(start..start + self.npt)
    }

    /// Text of one marker up to its first NUL byte.
    pub fn text_string(&self, item: usize) -> Option<String> {
        let raw = self.text(item)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Some(String::from_utf8_lossy(&raw[..end]).into_owned())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WavemarkChannel {
    pub timestamps: Vec<f64>,
    pub markers: Vec<[u8; MARKER_SIZE]>,
    /// Snippet samples, `points_per_spike` per item.
    pub wavemarks: Vec<i16>,
    pub points_per_spike: usize,
}

impl WavemarkChannel {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn waveform(&self, item: usize) -> Option<&[i16]> {
        let start = item.checked_mul(self.points_per_spike)?;
        self.wavemarks.get(start..start + self.points_per_spike)
    }
}
