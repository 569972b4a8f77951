use std::io;
use thiserror::Error;

use crate::types::ChannelKind;

#[derive(Debug, Error)]
pub enum SmrError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Channel index {index} out of range [1, {nchannel}]")]
    ChannelOutOfRange { index: usize, nchannel: i16 },

    #[error("Channel {index} is not a {expected} channel (kind: {found})")]
    WrongChannelKind {
        index: usize,
        expected: &'static str,
        found: ChannelKind,
    },

    #[error("Channel [{index} - {title}] contains no data")]
    NoData { index: usize, title: String },

    #[error("Channel {index} uses triggered sampling ({frames} frames), which is not supported")]
    TriggeredSampling { index: usize, frames: usize },

    #[error("Channel {index} of kind {kind} has no sample interval")]
    NoSampleInterval { index: usize, kind: ChannelKind },

    #[error("No channel labelled '{0}'")]
    LabelNotFound(String),

    #[error("Corrupt block chain in channel {index}: {reason}")]
    CorruptBlockChain { index: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, SmrError>;
