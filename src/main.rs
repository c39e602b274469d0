use anyhow::{Context, Result};
use cpal::traits::{DeviceTrait, StreamTrait};
use log::info;

use morse_player::{
    audio::{devices, output, NullTone, ToneOutput},
    coding::morse,
    scheduler::{self, Action, Timeline},
    timer::ThreadTimer,
    MorseScheduler, Notice,
};

mod args;

use args::Args;

fn main() -> Result<()> {
    let args = Args::parse();
    simple_logger::init_with_level(args.log_level())?;

    if args.dry_run {
        return dry_run(&args);
    }

    if args.null_audio {
        info!("[*] Playing without audio output");
        return play(NullTone::new(), &args);
    }

    let device = devices::output_device(&args.output_device)?;
    let config = device
        .default_output_config()
        .context("No supported output config")?;
    info!(
        "[*] Output hooked into `{}` ({})",
        device.name().unwrap_or_else(|_| "unknown".to_owned()),
        config.sample_rate().0
    );

    let (stream, tone) = output::open(&device, config, args.frequency, args.gain)?;
    stream.play().context("Failed to start output stream")?;
    play(tone, &args)
}

/// Plays the text and blocks until it finished.
fn play<O: ToneOutput + 'static>(tone: O, args: &Args) -> Result<()> {
    let timer = ThreadTimer::new().context("Failed to start timer thread")?;
    let scheduler = MorseScheduler::new(tone, timer, args.wpm, args.frequency)?;
    let notices = scheduler.notices();

    let report = scheduler.play(&args.text)?;
    for skipped in &report.skipped {
        eprintln!("[-] {skipped}");
    }
    if report.events == 0 {
        return Ok(());
    }

    for notice in notices.iter() {
        match notice {
            Notice::Finished { generation } if generation == report.generation => break,
            Notice::Finished { .. } => {}
            Notice::Fault(e) => return Err(e).context("Playback failed"),
        }
    }

    Ok(())
}

fn dry_run(args: &Args) -> Result<()> {
    let unit = scheduler::unit_length_ms(args.wpm)?;
    let timeline = Timeline::build(&args.text, unit);

    println!("[*] {}", morse::encode(&args.text));
    println!("[*] Unit {unit:.2} ms");
    for event in timeline.events() {
        let action = match event.action {
            Action::ToneOn => "on",
            Action::ToneOff => "off",
            Action::Finish => "end",
        };
        println!("{:>8} {action}", event.offset_ms);
    }
    for skipped in timeline.skipped() {
        eprintln!("[-] {skipped}");
    }

    Ok(())
}
