// 集成测试共用的辅助函数：在内存中构造小型 SMR 文件并写入临时文件
#![allow(dead_code)]

use std::io::Write;

use tempfile::NamedTempFile;

pub const KIND_CONTINUOUS: u8 = 1;
pub const KIND_EVENT_RISING: u8 = 3;
pub const KIND_EVENT_BOTH: u8 = 4;
pub const KIND_MARKER: u8 = 5;
pub const KIND_ADC_MARKER: u8 = 6;
pub const KIND_TEXT_MARKER: u8 = 8;

pub struct TestBlock {
    pub start_time: i32,
    pub end_time: i32,
    pub items: u16,
    pub payload: Vec<u8>,
}

impl TestBlock {
    /// Continuous samples, one per `step` ticks starting at `start_time`.
    pub fn samples(start_time: i32, step: i32, samples: &[i16]) -> Self {
        let end_time = start_time + step * (samples.len() as i32 - 1).max(0);
        TestBlock {
            start_time,
            end_time,
            items: samples.len() as u16,
            payload: samples.iter().flat_map(|s| s.to_le_bytes()).collect(),
        }
    }

    pub fn ticks(ticks: &[i32]) -> Self {
        TestBlock {
            start_time: ticks.first().copied().unwrap_or(0),
            end_time: ticks.last().copied().unwrap_or(0),
            items: ticks.len() as u16,
            payload: ticks.iter().flat_map(|t| t.to_le_bytes()).collect(),
        }
    }

    /// Marker items: time, marker code, then `extra` bytes copied verbatim.
    pub fn markers(items: &[(i32, [u8; 4], Vec<u8>)]) -> Self {
        let mut payload = Vec::new();
        for (time, code, extra) in items {
            payload.extend_from_slice(&time.to_le_bytes());
            payload.extend_from_slice(code);
            payload.extend_from_slice(extra);
        }
        TestBlock {
            start_time: items.first().map(|i| i.0).unwrap_or(0),
            end_time: items.last().map(|i| i.0).unwrap_or(0),
            items: items.len() as u16,
            payload,
        }
    }
}

pub struct TestChannel {
    pub index: usize,
    pub kind: u8,
    pub title: String,
    pub phy_chan: i16,
    pub nextra: i16,
    pub l_chan_dvd: i32,
    /// Kind-specific bytes written after the kind byte.
    pub tail: Vec<u8>,
    pub blocks: Vec<TestBlock>,
}

impl TestChannel {
    pub fn new(index: usize, kind: u8, title: &str) -> Self {
        TestChannel {
            index,
            kind,
            title: title.to_string(),
            phy_chan: index as i16 - 1,
            nextra: 0,
            l_chan_dvd: 0,
            tail: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Continuous or wavemark channel with scale, offset, units and divide.
    pub fn adc(index: usize, kind: u8, title: &str, divide: i16) -> Self {
        let mut channel = TestChannel::new(index, kind, title);
        channel.tail.extend_from_slice(&1.0f32.to_le_bytes());
        channel.tail.extend_from_slice(&0.0f32.to_le_bytes());
        channel.tail.extend(padded("V", 5));
        channel.tail.extend_from_slice(&divide.to_le_bytes());
        channel
    }

    pub fn with_blocks(mut self, blocks: Vec<TestBlock>) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn with_nextra(mut self, nextra: i16) -> Self {
        self.nextra = nextra;
        self
    }
}

pub struct SmrBuilder {
    pub system_id: i16,
    pub uspertime: i16,
    pub timeperadc: i16,
    pub dtimebase: f64,
    pub nchannel: i16,
    pub channels: Vec<TestChannel>,
    /// Cut the file after this many bytes.
    pub truncate: Option<usize>,
}

pub fn padded(text: &str, pad: usize) -> Vec<u8> {
    let mut out = vec![text.len() as u8];
    out.extend_from_slice(text.as_bytes());
    out.resize(1 + pad, 0);
    out
}

fn put(buf: &mut [u8], at: usize, bytes: &[u8]) {
    buf[at..at + bytes.len()].copy_from_slice(bytes);
}

impl SmrBuilder {
    pub fn new(nchannel: i16) -> Self {
        SmrBuilder {
            system_id: 1,
            uspertime: 1,
            timeperadc: 5,
            dtimebase: 1e-6,
            nchannel,
            channels: Vec::new(),
            truncate: None,
        }
    }

    pub fn channel(mut self, channel: TestChannel) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let data_start = 512 + 140 * self.nchannel as usize;

        // 所有通道的块倒序排列，保证没有任何链按时间顺序存储
        let mut order = Vec::new();
        for (c, channel) in self.channels.iter().enumerate() {
            for k in 0..channel.blocks.len() {
                order.push((c, k));
            }
        }
        order.reverse();

        let mut offsets: Vec<Vec<usize>> = self
            .channels
            .iter()
            .map(|channel| vec![0; channel.blocks.len()])
            .collect();
        let mut end = data_start;
        for &(c, k) in &order {
            offsets[c][k] = end;
            end += 20 + self.channels[c].blocks[k].payload.len();
        }

        let mut buf = vec![0u8; end];
        self.write_file_header(&mut buf);

        for (c, channel) in self.channels.iter().enumerate() {
            let slot = 512 + 140 * (channel.index - 1);
            let offs = &offsets[c];
            let first = offs.first().map(|&o| o as i32).unwrap_or(-1);
            let last = offs.last().map(|&o| o as i32).unwrap_or(-1);

            let mut record = Vec::with_capacity(140);
            record.extend_from_slice(&0i16.to_le_bytes());
            record.extend_from_slice(&(-1i32).to_le_bytes());
            record.extend_from_slice(&first.to_le_bytes());
            record.extend_from_slice(&last.to_le_bytes());
            record.extend_from_slice(&(channel.blocks.len() as i16).to_le_bytes());
            record.extend_from_slice(&channel.nextra.to_le_bytes());
            record.extend_from_slice(&[0u8; 8]);
            record.extend(padded("", 71));
            record.extend_from_slice(&0i32.to_le_bytes());
            record.extend_from_slice(&channel.l_chan_dvd.to_le_bytes());
            record.extend_from_slice(&channel.phy_chan.to_le_bytes());
            record.extend(padded(&channel.title, 9));
            record.extend_from_slice(&0f32.to_le_bytes());
            record.push(channel.kind);
            record.push(0);
            record.extend_from_slice(&channel.tail);
            record.resize(140, 0);
            put(&mut buf, slot, &record);

            for (k, block) in channel.blocks.iter().enumerate() {
                let pred = if k > 0 { offs[k - 1] as i32 } else { -1 };
                let succ = if k + 1 < offs.len() { offs[k + 1] as i32 } else { -1 };
                let at = offs[k];
                put(&mut buf, at, &pred.to_le_bytes());
                put(&mut buf, at + 4, &succ.to_le_bytes());
                put(&mut buf, at + 8, &block.start_time.to_le_bytes());
                put(&mut buf, at + 12, &block.end_time.to_le_bytes());
                put(&mut buf, at + 16, &(channel.index as i16).to_le_bytes());
                put(&mut buf, at + 18, &block.items.to_le_bytes());
                put(&mut buf, at + 20, &block.payload);
            }
        }

        if let Some(len) = self.truncate {
            buf.truncate(len);
        }
        buf
    }

    fn write_file_header(&self, buf: &mut [u8]) {
        put(buf, 0, &self.system_id.to_le_bytes());
        put(buf, 2, b"(C) CED 87");
        put(buf, 12, b"SMRTEST ");
        put(buf, 20, &self.uspertime.to_le_bytes());
        put(buf, 22, &self.timeperadc.to_le_bytes());
        put(buf, 26, &(512 + 140 * self.nchannel as i32).to_le_bytes());
        put(buf, 30, &self.nchannel.to_le_bytes());
        put(buf, 32, &140i16.to_le_bytes());
        put(buf, 44, &self.dtimebase.to_le_bytes());
        put(buf, 52, &[0, 0, 30, 9, 14, 6]);
        put(buf, 58, &2019i16.to_le_bytes());
        put(buf, 112, &padded("synthetic recording", 79));
    }

    pub fn write(&self) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&self.build()).unwrap();
        file.flush().unwrap();
        file
    }
}
