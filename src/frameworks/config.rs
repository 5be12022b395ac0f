use std::{env, net::IpAddr};

// Runtime/server settings read from the environment.

pub fn http_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080)
}

pub fn bind_addr() -> IpAddr {
    env::var("RELAY_BIND_ADDR")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(IpAddr::from([0, 0, 0, 0]))
}

pub fn outbound_capacity() -> usize {
    env::var("RELAY_OUTBOUND_CAPACITY")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|capacity| *capacity > 0)
        .unwrap_or(DEFAULT_OUTBOUND_CAPACITY)
}

// Frames buffered per connection before a slow client starts missing updates.
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 256;

pub const DEFAULT_LOG_FILTER: &str = "info";

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    // Anything other than `json` keeps the human-readable format.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}

pub fn log_format() -> LogFormat {
    LogFormat::parse(env::var("LOG_FORMAT").ok().as_deref())
}
