use clap::Parser;
use dotenv::dotenv;
use std::{env::args_os, ffi::OsString, path::PathBuf};

/// Flags that may also be written with a single dash, as in `-bind :8080`.
const LONG_FLAGS: [&str; 2] = ["bind", "debug"];

/// Share local files over HTTP through unguessable links.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Config {
    /// Files to share
    #[arg(required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// [address]:[port] address to bind to
    #[arg(long, env = "SHARE_BIND", default_value = ":8080")]
    pub bind: String,

    /// Enable per-request debug logs
    #[arg(long, env = "SHARE_DEBUG")]
    pub debug: bool,
}

impl Config {
    /// Reads `.env`, then the command line. Exits with usage on bad arguments.
    pub fn get() -> Self {
        dotenv().ok();

        Self::parse_from(normalize_args(args_os()))
    }

    /// The bind address with an empty host expanded to all interfaces.
    pub fn bind_addr(&self) -> String {
        if self.bind.starts_with(':') {
            format!("0.0.0.0{}", self.bind)
        } else {
            self.bind.clone()
        }
    }
}

/// Rewrites single-dash long flags (`-bind`, `-bind=:80`) to their
/// double-dash form. Everything after `--` is left alone.
pub fn normalize_args(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut positional_only = false;

    args.into_iter()
        .map(|arg| {
            if positional_only {
                return arg;
            }

            let Some(text) = arg.to_str() else {
                return arg;
            };

            if text == "--" {
                positional_only = true;
                return arg;
            }

            let flag = text
                .strip_prefix('-')
                .filter(|rest| !rest.starts_with('-'))
                .map(|rest| rest.split('=').next().unwrap_or_default());

            match flag {
                Some(flag) if LONG_FLAGS.contains(&flag) => format!("-{text}").into(),
                _ => arg,
            }
        })
        .collect()
}
