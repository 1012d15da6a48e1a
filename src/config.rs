use std::{env, str::FromStr, time::Duration};

use crate::error::{AppErr, AppResult};

pub const DEFAULT_PORT: u16 = 3000;
pub const STROKE_CAP: usize = 1000;
pub const CHAT_CAP: usize = 50;

/// Runtime settings, read once at startup from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
    pub limits: Limits,
    pub sweep_every: Duration,
}

/// History bounds applied to every room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub strokes: usize,
    pub chat: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self { strokes: STROKE_CAP, chat: CHAT_CAP }
    }
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|k| env::var(k).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let limits = Limits {
            strokes: parse(&get, "STROKE_CAPACITY", STROKE_CAP)?,
            chat:    parse(&get, "CHAT_CAPACITY", CHAT_CAP)?,
        };
        if limits.strokes == 0 || limits.chat == 0 {
            return Err(AppErr::Config("history capacities must be at least 1".into()));
        }

        Ok(Self {
            host:        get("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port:        parse(&get, "PORT", DEFAULT_PORT)?,
            static_dir:  get("STATIC_DIR").unwrap_or_else(|| "public".into()),
            limits,
            sweep_every: Duration::from_secs(parse(&get, "SWEEP_INTERVAL_SECS", 30u64)?.max(1)),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> AppResult<T> {
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppErr::Config(format!("{key}: cannot parse {raw:?}"))),
    }
}
