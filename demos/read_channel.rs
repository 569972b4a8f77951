use smrfile::{
    read_continuous_channel, read_event_channel, read_file_header, read_marker_channel,
    read_wavemark_channel, ChannelKind, Result,
};

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .format_target(false)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: read_channel <file.smr> <label or index>");
        std::process::exit(2);
    }
    let path = &args[1];

    let header = read_file_header(path)?;
    let index = match args[2].parse::<usize>() {
        Ok(index) => index,
        Err(_) => header.channel_index(&args[2])?,
    };
    let channel = header.channel_header(index)?;
    println!("channel {} '{}': {}", index, channel.title_str(), channel.kind);

    match channel.kind {
        ChannelKind::Continuous => {
            let data = read_continuous_channel(path, index)?;
            let physical = data.physical_samples();
            let max = physical.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
            let min = physical.iter().fold(f64::INFINITY, |a, &b| a.min(b));
            println!("  {} samples at {:.2} Hz", data.len(), data.sampling_rate);
            println!("  range: {:.4} to {:.4} {}", min, max, data.units.as_deref().unwrap_or(""));
        }
        kind if kind.is_event() => {
            let events = read_event_channel(path, index)?;
            println!("  {} events", events.len());
            for t in events.data.iter().take(10) {
                println!("  {:.6} s", t);
            }
        }
        kind if kind.is_marker() => {
            let markers = read_marker_channel(path, index)?;
            println!("  {} markers", markers.len());
            for i in 0..markers.len().min(10) {
                println!(
                    "  {:.6} s  code {:?}  {}",
                    markers.timestamps[i],
                    markers.markers[i],
                    markers.text_string(i).unwrap_or_default()
                );
            }
        }
        ChannelKind::AdcMarker => {
            let spikes = read_wavemark_channel(path, index)?;
            println!(
                "  {} spikes, {} points each",
                spikes.len(),
                spikes.points_per_spike
            );
        }
        other => println!("  no decoder for {}", other),
    }

    Ok(())
}
