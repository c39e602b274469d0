use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::Level;

pub struct Args {
    pub text: String,
    pub wpm: f64,
    pub frequency: f32,
    pub gain: f32,
    pub output_device: String,
    pub dry_run: bool,
    pub null_audio: bool,
    pub verbose: u8,
}

impl Args {
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    fn from_matches(m: &ArgMatches) -> Self {
        // All of these have defaults or are required
        Self {
            text: m.get_one::<String>("text").cloned().unwrap_or_default(),
            wpm: *m.get_one::<f64>("wpm").unwrap_or(&20.0),
            frequency: *m.get_one::<f32>("frequency").unwrap_or(&700.0),
            gain: *m.get_one::<f32>("gain").unwrap_or(&0.7),
            output_device: m
                .get_one::<String>("output-device")
                .cloned()
                .unwrap_or_else(|| "default".to_owned()),
            dry_run: m.get_flag("dry-run"),
            null_audio: m.get_flag("null-audio"),
            verbose: m.get_count("verbose"),
        }
    }

    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::Warn,
            1 => Level::Info,
            2 => Level::Debug,
            _ => Level::Trace,
        }
    }
}

fn command() -> Command {
    Command::new("morse-player")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Plays text as Morse code on your speakers.")
        .arg(
            Arg::new("text")
                .required(true)
                .help("Text to send, unsupported characters are skipped"),
        )
        .arg(
            Arg::new("wpm")
                .short('w')
                .long("wpm")
                .help("Speed in words per minute (PARIS)")
                .value_parser(value_parser!(f64))
                .default_value("20"),
        )
        .arg(
            Arg::new("frequency")
                .short('f')
                .long("frequency")
                .help("Tone pitch in Hz")
                .value_parser(value_parser!(f32))
                .default_value("700"),
        )
        .arg(
            Arg::new("gain")
                .short('g')
                .long("gain")
                .help("Tone volume, 0 to 1")
                .value_parser(value_parser!(f32))
                .default_value("0.7"),
        )
        .arg(
            Arg::new("output-device")
                .short('o')
                .long("output-device")
                .help("Output device, matched by name")
                .default_value("default"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Print the timeline instead of playing it")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("null-audio")
                .long("null-audio")
                .help("Play without opening an audio device")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .help("Log more, repeat for even more")
                .action(ArgAction::Count),
        )
}

#[cfg(test)]
mod test {
    use log::Level;

    use super::{command, Args};

    fn parse(args: &[&str]) -> Args {
        Args::from_matches(&command().try_get_matches_from(args).unwrap())
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["morse-player", "cq cq"]);
        assert_eq!(args.text, "cq cq");
        assert_eq!(args.wpm, 20.0);
        assert_eq!(args.frequency, 700.0);
        assert_eq!(args.gain, 0.7);
        assert_eq!(args.output_device, "default");
        assert!(!args.dry_run && !args.null_audio);
        assert_eq!(args.log_level(), Level::Warn);
    }

    #[test]
    fn test_flags() {
        let args = parse(&[
            "morse-player",
            "-w",
            "12.5",
            "--frequency",
            "550",
            "-o",
            "usb audio",
            "--dry-run",
            "-vv",
            "sos",
        ]);
        assert_eq!(args.text, "sos");
        assert_eq!(args.wpm, 12.5);
        assert_eq!(args.frequency, 550.0);
        assert_eq!(args.output_device, "usb audio");
        assert!(args.dry_run);
        assert_eq!(args.log_level(), Level::Debug);
    }

    #[test]
    fn test_text_required() {
        assert!(command().try_get_matches_from(["morse-player"]).is_err());
        assert!(command()
            .try_get_matches_from(["morse-player", "-w", "fast", "sos"])
            .is_err());
    }
}
