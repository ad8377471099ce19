use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use telemetry::{LineSource, ReaderSource, SerialSource};

use crate::config::{View, ViewerConfig};

pub const USAGE: &str = "\
Usage: tiltscope [OPTIONS]

Options:
  --config <FILE>             TOML config file
  --port <DEVICE>             Serial device, e.g. /dev/ttyUSB0 or COM4
  --baud <RATE>               Serial baud rate (default 115200)
  --view <axes|cube|scalar>   Presentation (default cube)
  --replay <FILE|->           Read lines from a file, or stdin with '-'
  --headless                  Log samples to the console without a window
  --print-config              Print the effective config as TOML and exit
  -h, --help                  Print this help
";

#[derive(Debug, Default)]
pub struct Args {
    pub config: Option<PathBuf>,
    pub port: Option<String>,
    pub baud: Option<u32>,
    pub view: Option<View>,
    pub replay: Option<PathBuf>,
    pub headless: bool,
    pub print_config: bool,
    pub help: bool,
}

impl Args {
    /// Parse arguments, program name excluded
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self> {
        let mut parsed = Args::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .with_context(|| format!("Missing value for {}", flag))
            };
            match arg.as_str() {
                "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
                "--port" => parsed.port = Some(value("--port")?),
                "--baud" => {
                    let raw = value("--baud")?;
                    parsed.baud = Some(
                        raw.parse()
                            .with_context(|| format!("Invalid baud rate {:?}", raw))?,
                    );
                }
                "--view" => parsed.view = Some(value("--view")?.parse()?),
                "--replay" => parsed.replay = Some(PathBuf::from(value("--replay")?)),
                "--headless" => parsed.headless = true,
                "--print-config" => parsed.print_config = true,
                "-h" | "--help" => parsed.help = true,
                other => bail!("Unknown argument {:?}\n\n{}", other, USAGE),
            }
        }
        Ok(parsed)
    }
}

/// Where telemetry lines come from
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Serial(String),
    Replay(PathBuf),
    Stdin,
}

impl Input {
    /// A replay flag wins over any configured port
    pub fn resolve(args: &Args, config: &ViewerConfig) -> Result<Self> {
        match (&args.replay, &config.port) {
            (Some(path), _) if path.as_os_str() == "-" => Ok(Input::Stdin),
            (Some(path), _) => Ok(Input::Replay(path.clone())),
            (None, Some(port)) => Ok(Input::Serial(port.clone())),
            (None, None) => bail!("No input: pass --port <DEVICE> or --replay <FILE>\n\n{}", USAGE),
        }
    }

    pub fn open(&self, config: &ViewerConfig) -> Result<Box<dyn LineSource + Send>> {
        let source: Box<dyn LineSource + Send> = match self {
            Input::Serial(port) => Box::new(
                SerialSource::open(port, config.baud_rate, config.read_timeout())
                    .with_context(|| format!("Failed to open serial port {}", port))?,
            ),
            Input::Replay(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open replay file {}", path.display()))?;
                Box::new(ReaderSource::new(BufReader::new(file)))
            }
            Input::Stdin => Box::new(ReaderSource::new(BufReader::new(std::io::stdin()))),
        };
        Ok(source)
    }

    pub fn describe(&self) -> String {
        match self {
            Input::Serial(port) => port.clone(),
            Input::Replay(path) => path.display().to_string(),
            Input::Stdin => "stdin".to_string(),
        }
    }
}
