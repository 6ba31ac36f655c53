//! kmsreset - reset DRM/KMS state before a display server starts
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  CLI / config  →  device path            │
//! │                        ↓                 │
//! │  drm::Device (open, atomic cap, IDs)     │
//! │                        ↓                 │
//! │  PropertyObject per connector/CRTC/plane │
//! │                        ↓                 │
//! │  AtomicBatch  →  one atomic commit       │
//! └──────────────────────────────────────────┘
//! ```

mod config;
mod constants;
mod drm;
mod reset;

use anyhow::{anyhow, Result};
use log::info;
use std::path::PathBuf;

const USAGE: &str = "\
Usage: kmsreset [options...]

  -d <path>       Specify DRM device (default: first primary node).
  -h              Show help message and quit.
";

/// What the command line asks for
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Help,
    Reset { device: Option<PathBuf> },
}

/// Parse getopt-style options ("hd:")
///
/// Options may be clustered (`-hd x`) and `-d` takes its value either
/// attached (`-d/dev/dri/card1`) or as the next argument. Non-option
/// arguments are ignored and `--` ends option parsing.
fn parse_args<I>(args: I) -> Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut device = None;

    while let Some(arg) = args.next() {
        if arg == "--" {
            break;
        }
        let Some(flags) = arg.strip_prefix('-').filter(|f| !f.is_empty()) else {
            continue;
        };

        for (i, flag) in flags.char_indices() {
            match flag {
                'h' => return Ok(Command::Help),
                'd' => {
                    let attached = &flags[i + 1..];
                    let value = if attached.is_empty() {
                        args.next()
                            .ok_or_else(|| anyhow!("option requires an argument -- 'd'"))?
                    } else {
                        attached.to_string()
                    };
                    device = Some(PathBuf::from(value));
                    break;
                }
                _ => return Err(anyhow!("invalid option -- '{}'", flag)),
            }
        }
    }

    Ok(Command::Reset { device })
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let device = match parse_args(std::env::args().skip(1)) {
        Ok(Command::Help) => {
            print!("{}", USAGE);
            return Ok(());
        }
        Ok(Command::Reset { device }) => device,
        Err(e) => {
            eprint!("{}", USAGE);
            return Err(e);
        }
    };

    let cfg = config::Config::load();

    let Some(path) = device
        .or_else(|| cfg.device.clone())
        .or_else(drm::find_primary_node)
    else {
        info!("No DRM primary node found, nothing to reset");
        return Ok(());
    };

    let device = drm::Device::open(&path)?;
    info!("Resetting KMS state on {}", device.path().display());

    // Commit failures are logged by the reset and don't change the exit code
    let report = reset::run(device, &reset::ResetOptions::from(&cfg));
    report.log();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_no_args() {
        assert_eq!(parse(&[]).unwrap(), Command::Reset { device: None });
    }

    #[test]
    fn test_device_separate_and_attached() {
        let expected = Command::Reset {
            device: Some(PathBuf::from("/dev/dri/card1")),
        };
        assert_eq!(parse(&["-d", "/dev/dri/card1"]).unwrap(), expected);
        assert_eq!(parse(&["-d/dev/dri/card1"]).unwrap(), expected);
    }

    #[test]
    fn test_last_device_wins() {
        assert_eq!(
            parse(&["-d", "a", "-d", "b"]).unwrap(),
            Command::Reset {
                device: Some(PathBuf::from("b"))
            }
        );
    }

    #[test]
    fn test_help() {
        assert_eq!(parse(&["-h"]).unwrap(), Command::Help);
        assert_eq!(parse(&["-d", "x", "-h"]).unwrap(), Command::Help);
        assert_eq!(parse(&["-hd", "x"]).unwrap(), Command::Help);
    }

    #[test]
    fn test_unknown_option_fails() {
        assert!(parse(&["-x"]).is_err());
        assert!(parse(&["--device", "x"]).is_err());
        // Parsing stops at the first bad option, like getopt's caller does
        assert!(parse(&["-x", "-h"]).is_err());
    }

    #[test]
    fn test_missing_device_argument() {
        let err = parse(&["-d"]).unwrap_err();
        assert!(err.to_string().contains("requires an argument"));
    }

    #[test]
    fn test_positional_and_double_dash() {
        assert_eq!(parse(&["foo", "-"]).unwrap(), Command::Reset { device: None });
        assert_eq!(parse(&["--", "-x"]).unwrap(), Command::Reset { device: None });
    }
}
