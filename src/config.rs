use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use anyhow::{Context, Result};

/// How long a session stays valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionTtl {
    /// Lifetime of a session created without "remember me".
    pub standard: chrono::Duration,
    /// Lifetime of a session created with "remember me".
    pub remembered: chrono::Duration,
}

impl SessionTtl {
    /// Builds lifetimes from whole hours and days, rejecting values chrono cannot represent.
    pub fn from_units(standard_hours: i64, remembered_days: i64) -> Result<Self> {
        if standard_hours <= 0 || remembered_days <= 0 {
            anyhow::bail!("SESSION_HOURS and REMEMBER_DAYS must be positive");
        }
        Ok(Self {
            standard: chrono::TimeDelta::try_hours(standard_hours)
                .context("SESSION_HOURS is out of range")?,
            remembered: chrono::TimeDelta::try_days(remembered_days)
                .context("REMEMBER_DAYS is out of range")?,
        })
    }
}

impl Default for SessionTtl {
    fn default() -> Self {
        Self {
            standard: chrono::Duration::hours(24),
            remembered: chrono::Duration::days(30),
        }
    }
}

/// Fixed waits standing in for the network round trips of the auth forms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimulatedLatency {
    pub sign_in: Duration,
    pub sign_up: Duration,
    pub google: Duration,
}

impl SimulatedLatency {
    /// No waiting at all.
    pub fn none() -> Self {
        Self {
            sign_in: Duration::ZERO,
            sign_up: Duration::ZERO,
            google: Duration::ZERO,
        }
    }
}

impl Default for SimulatedLatency {
    fn default() -> Self {
        Self {
            sign_in: Duration::from_millis(1000),
            sign_up: Duration::from_millis(1500),
            google: Duration::from_millis(1500),
        }
    }
}

/// The application's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// The URL of the Redis server. Without one, records live in memory.
    pub redis_url: Option<String>,
    /// The directory holding the static pages.
    pub public_dir: PathBuf,
    /// Session lifetimes.
    pub session_ttl: SessionTtl,
    /// Simulated form latencies.
    pub latency: SimulatedLatency,
    /// Whether cookies carry the `Secure` flag.
    pub secure_cookies: bool,
    /// Origins allowed by the CORS layer.
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            redis_url: None,
            public_dir: PathBuf::from("files/public"),
            session_ttl: SessionTtl::default(),
            latency: SimulatedLatency::default(),
            secure_cookies: false,
            cors_origins: default_cors_origins(),
        }
    }
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://[::1]:3000".to_string(),
    ]
}

fn millis_var(name: &str, default: Duration) -> Result<Duration> {
    match env::var(name) {
        Ok(raw) => {
            let ms: u64 = raw
                .parse()
                .with_context(|| format!("Invalid {name}: expected milliseconds"))?;
            Ok(Duration::from_millis(ms))
        }
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let bind_addr = match env::var("BIND_ADDR") {
            Ok(raw) => raw.parse().context("Invalid BIND_ADDR")?,
            Err(_) => defaults.bind_addr,
        };

        let session_hours: i64 = env::var("SESSION_HOURS")
            .unwrap_or_else(|_| "24".to_string())
            .parse()
            .context("Invalid SESSION_HOURS")?;
        let remember_days: i64 = env::var("REMEMBER_DAYS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .context("Invalid REMEMBER_DAYS")?;
        let session_ttl = SessionTtl::from_units(session_hours, remember_days)?;

        let latency = SimulatedLatency {
            sign_in: millis_var("SIGNIN_DELAY_MS", defaults.latency.sign_in)?,
            sign_up: millis_var("SIGNUP_DELAY_MS", defaults.latency.sign_up)?,
            google: millis_var("GOOGLE_DELAY_MS", defaults.latency.google)?,
        };

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_else(|_| default_cors_origins());

        Ok(Self {
            bind_addr,
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.trim().is_empty()),
            public_dir: env::var("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.public_dir),
            session_ttl,
            latency,
            secure_cookies: env::var("APP_ENV")
                .unwrap_or_else(|_| "development".to_string())
                == "production",
            cors_origins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ttl_from_units() {
        let ttl = SessionTtl::from_units(24, 30).unwrap();
        assert_eq!(ttl, SessionTtl::default());
    }

    #[test]
    fn session_ttl_rejects_bad_units() {
        assert!(SessionTtl::from_units(0, 30).is_err());
        assert!(SessionTtl::from_units(24, -1).is_err());
        assert!(SessionTtl::from_units(24, 100_000_000_000_000).is_err());
        assert!(SessionTtl::from_units(i64::MAX, 30).is_err());
    }
}
