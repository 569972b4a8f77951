use smrfile::{read_file_header, Result};

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .format_target(false)
        .init();

    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("usage: channel_info <file.smr>");
            std::process::exit(2);
        }
    };

    let header = read_file_header(&path)?;
    println!("=== {} ===", path);
    println!("  version: {}", header.system_id);
    println!("  channel slots: {}", header.nchannel);
    println!("  us per tick: {}, time base: {:e} s", header.uspertime, header.dtimebase);
    if let Some(at) = header.recorded_at() {
        println!("  recorded: {}", at);
    }
    for comment in header.comments.iter().flatten() {
        println!("  comment: {}", comment);
    }

    println!();
    for channel in header.channels() {
        println!(
            "{:<9}| index: {},  kind: {}, port: {}",
            channel.label, channel.index, channel.kind, channel.port
        );
    }

    Ok(())
}
