use std::path::Path;

use log::warn;

use crate::error::{Result, SmrError};
use crate::header::{read_channel_header, read_file_header};
use crate::types::{ChannelHeader, ChannelKind, ChannelSummary, FileHeader};
use crate::utils::labels_match;

impl From<&ChannelHeader> for ChannelSummary {
    fn from(channel: &ChannelHeader) -> Self {
        ChannelSummary {
            label: channel.title_str().to_string(),
            index: channel.index,
            kind: channel.kind,
            port: channel.phy_chan,
        }
    }
}

/// Lists every channel in use, in index order.
///
/// A channel whose header cannot be read is skipped with a warning rather
/// than failing the whole listing; unused slots (kind 0) are left out.
pub fn read_channel_info_array(file_header: &FileHeader) -> Vec<ChannelSummary> {
    let nchannel = usize::try_from(file_header.nchannel).unwrap_or(0);

    (1..=nchannel)
        .filter_map(|index| match read_channel_header(file_header, index) {
            Ok(channel) => Some(ChannelSummary::from(&channel)),
            Err(e) => {
                warn!("failed to read header for channel {}: {}", index, e);
                None
            }
        })
        .filter(|summary| summary.kind != ChannelKind::Unused)
        .collect()
}

/// Lists the channels of the file at `path`.
///
/// # Examples
///
/// ```rust,no_run
/// for channel in smrfile::read_channel_array("recording.smr")? {
///     println!("{:<9}| index: {}, kind: {}, port: {}",
///         channel.label, channel.index, channel.kind, channel.port);
/// }
/// # Ok::<(), smrfile::SmrError>(())
/// ```
pub fn read_channel_array<P: AsRef<Path>>(path: P) -> Result<Vec<ChannelSummary>> {
    let file_header = read_file_header(path)?;
    Ok(read_channel_info_array(&file_header))
}

/// Finds the index of the first channel titled `label`, ignoring ASCII case.
pub fn channel_label_to_index(file_header: &FileHeader, label: &str) -> Result<usize> {
    find_label(&read_channel_info_array(file_header), label)
}

/// Same as [`channel_label_to_index`], reading the file header from `path`.
pub fn channel_label_path_to_index<P: AsRef<Path>>(path: P, label: &str) -> Result<usize> {
    let file_header = read_file_header(path)?;
    channel_label_to_index(&file_header, label)
}

pub(crate) fn find_label(channels: &[ChannelSummary], label: &str) -> Result<usize> {
    // 无标题通道的标签为空，不参与匹配
    channels
        .iter()
        .filter(|channel| !channel.label.is_empty())
        .find(|channel| labels_match(label, &channel.label))
        .map(|channel| channel.index)
        .ok_or_else(|| SmrError::LabelNotFound(label.to_string()))
}

/// Indices of every listed channel of the given kind.
pub fn channel_indices_of_kind(channels: &[ChannelSummary], kind: ChannelKind) -> Vec<usize> {
    channels
        .iter()
        .filter(|channel| channel.kind == kind)
        .map(|channel| channel.index)
        .collect()
}

impl FileHeader {
    /// Lists every channel in use.
    pub fn channels(&self) -> Vec<ChannelSummary> {
        read_channel_info_array(self)
    }

    /// Index of the first channel titled `label`, ignoring ASCII case.
    pub fn channel_index(&self, label: &str) -> Result<usize> {
        channel_label_to_index(self, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(label: &str, index: usize, kind: ChannelKind) -> ChannelSummary {
        ChannelSummary {
            label: label.to_string(),
            index,
            kind,
            port: index as i16 - 1,
        }
    }

    #[test]
    fn test_find_label() {
        let channels = vec![
            summary("Keyboard", 2, ChannelKind::Marker),
            summary("Cont 5", 5, ChannelKind::Continuous),
            summary("cont 5", 7, ChannelKind::Continuous),
        ];

        assert_eq!(find_label(&channels, "cont 5").unwrap(), 5);
        assert_eq!(find_label(&channels, "CONT 5").unwrap(), 5);
        assert_eq!(find_label(&channels, "keyboard").unwrap(), 2);
        assert!(matches!(
            find_label(&channels, "Cont"),
            Err(SmrError::LabelNotFound(label)) if label == "Cont"
        ));
    }

    #[test]
    fn test_untitled_channels_never_match() {
        let channels = vec![
            summary("", 1, ChannelKind::Continuous),
            summary("Keyboard", 2, ChannelKind::Marker),
        ];

        assert!(matches!(
            find_label(&channels, ""),
            Err(SmrError::LabelNotFound(label)) if label.is_empty()
        ));
        assert_eq!(find_label(&channels, "keyboard").unwrap(), 2);
    }

    #[test]
    fn test_channel_indices_of_kind() {
        let channels = vec![
            summary("a", 1, ChannelKind::Continuous),
            summary("b", 2, ChannelKind::Marker),
            summary("c", 4, ChannelKind::Continuous),
        ];
        assert_eq!(channel_indices_of_kind(&channels, ChannelKind::Continuous), vec![1, 4]);
        assert!(channel_indices_of_kind(&channels, ChannelKind::AdcMarker).is_empty());
    }
}
