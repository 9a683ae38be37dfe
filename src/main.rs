//! SteelSeries Siberia 350 CLI tool
//!
//! Commands are written to the headset's vendor interface with class control
//! transfers. The protocol was captured from the official configuration
//! software; most of the transmitted bytes have no known meaning.

use std::process;
use std::str::FromStr;

use clap::{crate_description, crate_name, crate_version, Arg, ArgAction, ArgMatches, Command};
use tracing_subscriber::EnvFilter;

use crate::color::Rgb;
use crate::equalizer::{Band, Setting};
use crate::error::{HeadsetError, HeadsetResult};
use crate::session::Session;

mod color;
mod command;
mod equalizer;
mod error;
mod microphone;
mod session;
mod transport;

/// Requested headset changes.
#[derive(Default, PartialEq, Debug)]
struct Config {
    color: Option<Rgb>,
    mic_auto: Option<bool>,
    equalizer: Vec<Setting>,
}

impl Config {
    fn from_cli(matches: &ArgMatches) -> HeadsetResult<Self> {
        let mut config = Config::default();

        if let Some(color) = matches.get_one::<String>("color") {
            config.color = Some(Rgb::from_str(color)?);
        }

        if matches.get_flag("mic-auto") {
            config.mic_auto = Some(true);
        } else if matches.get_flag("no-mic-auto") {
            config.mic_auto = Some(false);
        }

        if let Some(equalizer) = matches.get_one::<String>("equalizer") {
            config.equalizer = parse_equalizer(equalizer)?;
        }

        Ok(config)
    }

    /// Check if any change was requested.
    fn is_empty(&self) -> bool {
        self.color.is_none() && self.mic_auto.is_none() && self.equalizer.is_empty()
    }
}

/// Parse equalizer gains in the `dB,dB,dB,dB,dB` format.
///
/// Empty entries leave their band untouched.
fn parse_equalizer(s: &str) -> HeadsetResult<Vec<Setting>> {
    let gains: Vec<&str> = s.split(',').map(str::trim).collect();
    if gains.len() != Band::ALL.len() {
        return Err(HeadsetError::InvalidArgument(format!(
            "invalid equalizer setting {:?}: expected {} bands",
            s,
            Band::ALL.len()
        )));
    }

    let mut settings = Vec::new();
    for (band, gain) in Band::ALL.iter().zip(gains) {
        if gain.is_empty() {
            continue;
        }

        let gain = f32::from_str(gain).map_err(|_| {
            HeadsetError::InvalidArgument(format!("invalid equalizer gain: {:?}", gain))
        })?;
        settings.push(Setting::from_db(*band, gain)?);
    }

    Ok(settings)
}

fn main() {
    let matches = cli().get_matches();

    init_logging(matches.get_flag("verbose"));

    let config = match Config::from_cli(&matches) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", err);
            process::exit(2);
        },
    };

    if config.is_empty() {
        let _ = cli().print_help();
        return;
    }

    match write_config(&config) {
        Ok(()) => println!("\x1b[32mSuccessfully applied changes.\x1b[0m"),
        Err(err) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", err);
            process::exit(1);
        },
    }
}

/// Setup log output to STDERR.
fn init_logging(verbose: bool) {
    let default = if verbose { "siberia=debug" } else { "siberia=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Write a config to the headset.
fn write_config(config: &Config) -> HeadsetResult<()> {
    let mut session = Session::open()?;

    if let Some(color) = config.color {
        println!("Setting color to {}", color);
        session.set_color(color)?;
    }

    if let Some(enabled) = config.mic_auto {
        if enabled {
            println!("Enabling mic auto optimization");
        } else {
            println!("Disabling mic auto optimization");
        }
        session.set_microphone_optimization(enabled)?;
    }

    if !config.equalizer.is_empty() {
        println!("Setting equalizer:");
    }

    for setting in &config.equalizer {
        println!(" {:>7} - {:>5} dB", setting.band(), setting.gain());
        session.set_equalizer(setting.band().index(), setting.value())?;
    }

    Ok(())
}

/// Get clap CLI parameters.
fn cli() -> Command {
    Command::new(crate_name!())
        .version(crate_version!())
        .author("Christian Duerr <contact@christianduerr.com>")
        .about(crate_description!())
        .arg(Arg::new("color").help("LED color [RRGGBB]").long("color").short('c'))
        .arg(
            Arg::new("mic-auto")
                .help("Enable microphone auto optimization")
                .long("mic-auto")
                .action(ArgAction::SetTrue)
                .conflicts_with("no-mic-auto"),
        )
        .arg(
            Arg::new("no-mic-auto")
                .help("Disable microphone auto optimization")
                .long("no-mic-auto")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("equalizer")
                .help("Equalizer gains in dB from 80 Hz to 13 kHz [possible values: -12..=12]")
                .long("equalizer")
                .short('e')
                .allow_hyphen_values(true)
                .value_name("dB,dB,dB,dB,dB"),
        )
        .arg(
            Arg::new("verbose")
                .help("Print every packet sent to the headset")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue),
        )
}
