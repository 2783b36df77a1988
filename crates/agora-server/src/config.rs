use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use agora_simulator::SimulationConfig;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub request_timeout: Duration,
    /// `None` when `AGORA_SIM_USERS` is 0.
    pub simulation: Option<SimulationConfig>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from `lookup`, which returns a variable's value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("AGORA_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse(&lookup, "AGORA_PORT", 3000)?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let request_timeout = Duration::from_millis(parse(&lookup, "AGORA_REQUEST_TIMEOUT_MS", 5000)?);

        let users: usize = parse(&lookup, "AGORA_SIM_USERS", 10)?;
        let simulation = if users == 0 {
            None
        } else {
            let duration = Duration::from_secs(parse(&lookup, "AGORA_SIM_DURATION_SECS", 60)?);
            let seed = match lookup("AGORA_SIM_SEED") {
                Some(raw) => Some(
                    raw.parse::<u64>()
                        .with_context(|| format!("AGORA_SIM_SEED is not a number: {}", raw))?,
                ),
                None => None,
            };
            Some(SimulationConfig {
                request_timeout,
                seed,
                ..SimulationConfig::with_users(users, duration)
            })
        };

        Ok(Self {
            addr,
            request_timeout,
            simulation,
        })
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.addr, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.request_timeout, Duration::from_secs(5));

        let sim = config.simulation.unwrap();
        assert_eq!(sim.users, 10);
        assert_eq!(sim.duration, Duration::from_secs(60));
        assert_eq!(sim.seed, None);
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("AGORA_HOST", "127.0.0.1"),
            ("AGORA_PORT", "8080"),
            ("AGORA_REQUEST_TIMEOUT_MS", "250"),
            ("AGORA_SIM_USERS", "100"),
            ("AGORA_SIM_DURATION_SECS", "5"),
            ("AGORA_SIM_SEED", "42"),
        ])
        .unwrap();
        assert_eq!(config.addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());

        let sim = config.simulation.unwrap();
        assert_eq!(sim.users, 100);
        assert_eq!(sim.duration, Duration::from_secs(5));
        assert_eq!(sim.request_timeout, Duration::from_millis(250));
        assert_eq!(sim.seed, Some(42));
    }

    #[test]
    fn zero_users_disables_the_simulation() {
        assert!(config(&[("AGORA_SIM_USERS", "0")]).unwrap().simulation.is_none());
    }

    #[test]
    fn bad_values_name_the_variable() {
        let err = config(&[("AGORA_PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("AGORA_PORT"));

        let err = config(&[("AGORA_SIM_SEED", "-1")]).unwrap_err();
        assert!(err.to_string().contains("AGORA_SIM_SEED"));
    }
}
