//! # SMR reader for Rust
//!
//! A pure Rust library for reading SMR (SON) files, the multi-channel
//! electrophysiology recordings written by CED data acquisition software.
//! Channels are decoded into plain typed buffers: raw ADC samples for
//! waveform channels, times in seconds for event channels, and parallel
//! time / marker code / payload buffers for marker and wavemark channels.
//!
//! The library only reads. Each call opens the file, decodes what it needs
//! and closes it again; nothing is cached between calls.
//!
//! ## Quick Start
//!
//! ### Listing channels
//!
//! ```rust,no_run
//! use smrfile::{read_file_header, Result};
//!
//! fn main() -> Result<()> {
//!     let header = read_file_header("recording.smr")?;
//!     println!("Format version: {}", header.system_id);
//!
//!     for channel in header.channels() {
//!         println!("{:<9}| index: {}, kind: {}, port: {}",
//!             channel.label, channel.index, channel.kind, channel.port);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Reading a channel by label
//!
//! ```rust,no_run
//! use smrfile::{read_continuous_channel, read_file_header, Result};
//!
//! fn main() -> Result<()> {
//!     let header = read_file_header("recording.smr")?;
//!     let index = header.channel_index("ecg")?;
//!
//!     let channel = read_continuous_channel("recording.smr", index)?;
//!     println!("{} samples at {:.1} Hz", channel.len(), channel.sampling_rate);
//!
//!     // raw ADC values to the channel's units
//!     let volts = channel.physical_samples();
//!     println!("first value: {:?} {}", volts.first(), channel.units.as_deref().unwrap_or(""));
//!     Ok(())
//! }
//! ```
//!
//! ## File layout
//!
//! | Region | Size | Content |
//! |--------|------|---------|
//! | file header | 512 bytes | version, clock units, channel count, comments |
//! | channel headers | 140 bytes each | one slot per channel, starting at byte 512 |
//! | data blocks | 20-byte header + payload | scattered, linked per channel |
//!
//! All values are little-endian. A channel's blocks are linked through the
//! file and must be walked to put them back in time order, see
//! [`read_block_chain`].
//!
//! ## Channel kinds
//!
//! | Kind | Decoder | Items |
//! |------|---------|-------|
//! | continuous | [`read_continuous_channel`] | `i16` samples |
//! | event-, event+, level | [`read_event_channel`] | times |
//! | marker, textmark | [`read_marker_channel`] | times, 4-byte codes, text |
//! | wavemark | [`read_wavemark_channel`] | times, 4-byte codes, `i16` snippets |
//!
//! Triggered (non-contiguous) continuous sampling is detected and reported as
//! [`SmrError::TriggeredSampling`].

pub mod error;
pub mod types;
pub mod utils;
pub mod header;
pub mod blocks;
pub mod reader;
pub mod catalog;

// 重新导出主要类型
pub use error::{SmrError, Result};
pub use types::{
    BlockDescriptor, ChannelHeader, ChannelKind, ChannelSummary, ContinuousChannel, EventChannel,
    FileHeader, KindParams, MarkerChannel, RateDivisor, WavemarkChannel,
};
pub use header::{read_channel_header, read_file_header};
pub use blocks::read_block_chain;
pub use reader::{
    read_continuous_channel, read_continuous_channel_from_header, read_event_channel,
    read_marker_channel, read_wavemark_channel, sample_interval, sampling_rate,
};
pub use catalog::{
    channel_indices_of_kind, channel_label_path_to_index, channel_label_to_index,
    read_channel_array, read_channel_info_array,
};

// 文件格式常量
pub const FILE_HEADER_SIZE: u64 = 512;
pub const CHANNEL_HEADER_SIZE: u64 = 140;
pub const BLOCK_HEADER_SIZE: u64 = 20;
/// Bytes in the marker code attached to every marker item.
pub const MARKER_SIZE: usize = 4;
pub const COMMENT_COUNT: usize = 5;
pub const MICROSECONDS: f64 = 1_000_000.0;

/// Library version
///
/// Returns the current version of the smrfile library.
///
/// # Examples
///
/// ```rust
/// let version = smrfile::version();
/// assert!(!version.is_empty());
/// assert!(version.contains('.'));
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
