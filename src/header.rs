use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Result, SmrError};
use crate::types::{ChannelHeader, ChannelKind, FileHeader, KindParams, RateDivisor};
use crate::utils::{read_chars, read_padded_string};
use crate::{CHANNEL_HEADER_SIZE, COMMENT_COUNT, FILE_HEADER_SIZE};

/// Opens a file for one decode pass.
pub(crate) fn open_file(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path)
        .map_err(|e| SmrError::FileNotFound(format!("{}: {}", path.display(), e)))?;
    Ok(BufReader::new(file))
}

/// Reads the file header of an SMR file.
///
/// # Examples
///
/// ```rust,no_run
/// let header = smrfile::read_file_header("recording.smr")?;
/// println!("version {} with {} channel slots", header.system_id, header.nchannel);
/// # Ok::<(), smrfile::SmrError>(())
/// ```
pub fn read_file_header<P: AsRef<Path>>(path: P) -> Result<FileHeader> {
    let path = path.as_ref();
    let mut reader = open_file(path)?;
    parse_file_header(&mut reader, path.to_path_buf())
}

pub(crate) fn parse_file_header<R: Read + Seek>(reader: &mut R, path: PathBuf) -> Result<FileHeader> {
    reader.seek(SeekFrom::Start(0))?;

    let system_id = reader.read_i16::<LittleEndian>()?;
    let copyright = read_chars(reader, 10)?;
    let creator = read_chars(reader, 8)?;

    let uspertime = reader.read_i16::<LittleEndian>()?;
    let timeperadc = reader.read_i16::<LittleEndian>()?;
    let filestate = reader.read_i16::<LittleEndian>()?;
    let first_data = reader.read_i32::<LittleEndian>()?;

    let nchannel = reader.read_i16::<LittleEndian>()?;
    let chansize = reader.read_i16::<LittleEndian>()?;
    let extra_data = reader.read_i16::<LittleEndian>()?;
    let buffersize = reader.read_i16::<LittleEndian>()?;
    let os_format = reader.read_i16::<LittleEndian>()?;

    let max_time = reader.read_i32::<LittleEndian>()?;
    let dtimebase = reader.read_f64::<LittleEndian>()?;

    let mut time_detail = [0u8; 6];
    reader.read_exact(&mut time_detail)?;
    let time_year = reader.read_i16::<LittleEndian>()?;

    // 注释前有 52 个保留字节
    reader.seek(SeekFrom::Current(52))?;

    let mut comments: [Option<String>; COMMENT_COUNT] = Default::default();
    for comment in comments.iter_mut() {
        *comment = read_padded_string(reader, 79)?;
    }

    Ok(FileHeader {
        path,
        system_id,
        copyright,
        creator,
        uspertime,
        timeperadc,
        filestate,
        first_data,
        nchannel,
        chansize,
        extra_data,
        buffersize,
        os_format,
        max_time,
        dtimebase,
        time_detail,
        time_year,
        comments,
    })
}

/// Reads the header of channel `index` (1-based).
///
/// The index is checked against the file header before the file is touched.
///
/// # Errors
///
/// * `SmrError::ChannelOutOfRange` - `index` is outside `1..=nchannel`
/// * `SmrError::FileNotFound` / `SmrError::Io` - the slot cannot be read
pub fn read_channel_header(file_header: &FileHeader, index: usize) -> Result<ChannelHeader> {
    check_index(file_header, index)?;
    let mut reader = open_file(&file_header.path)?;
    parse_channel_header(&mut reader, file_header, index)
}

fn check_index(file_header: &FileHeader, index: usize) -> Result<()> {
    let nchannel = file_header.nchannel;
    if index < 1 || index > usize::try_from(nchannel).unwrap_or(0) {
        return Err(SmrError::ChannelOutOfRange { index, nchannel });
    }
    Ok(())
}

pub(crate) fn parse_channel_header<R: Read + Seek>(
    reader: &mut R,
    file_header: &FileHeader,
    index: usize,
) -> Result<ChannelHeader> {
    check_index(file_header, index)?;

    let slot = FILE_HEADER_SIZE + CHANNEL_HEADER_SIZE * (index as u64 - 1);
    reader.seek(SeekFrom::Start(slot))?;

    let del_size = reader.read_i16::<LittleEndian>()?;
    let next_del_block = reader.read_i32::<LittleEndian>()?;
    let first_block = reader.read_i32::<LittleEndian>()?;
    let last_block = reader.read_i32::<LittleEndian>()?;

    let nblock = reader.read_i16::<LittleEndian>()?;
    let nextra = reader.read_i16::<LittleEndian>()?;
    let pre_trig = reader.read_i16::<LittleEndian>()?;
    let free0 = reader.read_i16::<LittleEndian>()?;
    let phy_sz = reader.read_i16::<LittleEndian>()?;
    let max_data = reader.read_i16::<LittleEndian>()?;

    let comment = read_padded_string(reader, 71)?;

    let max_chan_time = reader.read_i32::<LittleEndian>()?;
    let l_chan_dvd = reader.read_i32::<LittleEndian>()?;
    let phy_chan = reader.read_i16::<LittleEndian>()?;

    let title = read_padded_string(reader, 9)?;

    let ideal_rate = reader.read_f32::<LittleEndian>()?;
    let kind = ChannelKind::from_code(reader.read_u8()?);
    let _pad = reader.read_i8()?;

    let params = match kind {
        ChannelKind::Continuous | ChannelKind::AdcMarker => {
            let scale = reader.read_f32::<LittleEndian>()?;
            let offset = reader.read_f32::<LittleEndian>()?;
            let units = read_padded_string(reader, 5)?;
            let rate = read_rate_divisor(reader, file_header.system_id)?;
            KindParams::Adc { scale, offset, units, rate }
        }
        ChannelKind::RealMarker | ChannelKind::RealWave => {
            let min = reader.read_f32::<LittleEndian>()?;
            let max = reader.read_f32::<LittleEndian>()?;
            let units = read_padded_string(reader, 5)?;
            let rate = read_rate_divisor(reader, file_header.system_id)?;
            KindParams::Real { min, max, units, rate }
        }
        ChannelKind::EventBoth => {
            let init_low = reader.read_u8()?;
            let next_low = reader.read_u8()?;
            KindParams::EventLevel { init_low, next_low }
        }
        _ => KindParams::None,
    };

    Ok(ChannelHeader {
        path: file_header.path.clone(),
        index,
        del_size,
        next_del_block,
        first_block,
        last_block,
        nblock,
        nextra,
        pre_trig,
        free0,
        phy_sz,
        max_data,
        comment,
        max_chan_time,
        l_chan_dvd,
        phy_chan,
        title,
        ideal_rate,
        kind,
        params,
    })
}

fn read_rate_divisor<R: Read>(reader: &mut R, system_id: i16) -> Result<RateDivisor> {
    let value = reader.read_i16::<LittleEndian>()?;
    Ok(if system_id < 6 {
        RateDivisor::Divide(value)
    } else {
        RateDivisor::Interleave(value)
    })
}

impl FileHeader {
    /// Reads the header of channel `index` (1-based) from the same file.
    pub fn channel_header(&self, index: usize) -> Result<ChannelHeader> {
        read_channel_header(self, index)
    }
}
