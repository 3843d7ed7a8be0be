use crate::error::ConfigError;
use crate::topology::{DEFAULT_FLOOR_SIZES, Topology};
use axum::http::HeaderValue;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

pub const DEFAULT_OCCUPANCY_RATE: f64 = 0.3;
const DEFAULT_PORT: u16 = 5000;

/// Runtime settings, read from `HOTEL_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub addr: SocketAddr,
    pub floor_sizes: Vec<u32>,
    /// Fixed seed for the occupancy generator; entropy when unset.
    pub seed: Option<u64>,
    pub default_rate: f64,
    /// Single origin allowed by CORS; every origin when unset.
    pub cors_origin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT),
            floor_sizes: DEFAULT_FLOOR_SIZES.to_vec(),
            seed: None,
            default_rate: DEFAULT_OCCUPANCY_RATE,
            cors_origin: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("HOTEL_HOST") {
            let ip = parse("HOTEL_HOST", &host)?;
            config.addr.set_ip(ip);
        }
        if let Some((key, port)) = lookup("HOTEL_PORT")
            .map(|v| ("HOTEL_PORT", v))
            .or_else(|| lookup("PORT").map(|v| ("PORT", v)))
        {
            config.addr.set_port(parse(key, &port)?);
        }
        if let Some(sizes) = lookup("HOTEL_FLOOR_SIZES") {
            config.floor_sizes = sizes
                .split(',')
                .map(|s| parse("HOTEL_FLOOR_SIZES", s.trim()))
                .collect::<Result<_, _>>()?;
        }
        if let Some(seed) = lookup("HOTEL_SEED") {
            config.seed = Some(parse("HOTEL_SEED", &seed)?);
        }
        if let Some(rate) = lookup("HOTEL_DEFAULT_RATE") {
            let rate: f64 = parse("HOTEL_DEFAULT_RATE", &rate)?;
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::InvalidValue {
                    key: "HOTEL_DEFAULT_RATE",
                    value: rate.to_string(),
                    reason: "must be between 0 and 1".to_string(),
                });
            }
            config.default_rate = rate;
        }

        if let Some((key, origin)) = lookup("HOTEL_CORS_ORIGIN")
            .map(|v| ("HOTEL_CORS_ORIGIN", v))
            .or_else(|| lookup("CORS_ORIGIN").map(|v| ("CORS_ORIGIN", v)))
        {
            let origin = origin.trim().to_string();
            if origin != "*" {
                HeaderValue::from_str(&origin).map_err(|e| ConfigError::InvalidValue {
                    key,
                    value: origin.clone(),
                    reason: e.to_string(),
                })?;
                config.cors_origin = Some(origin);
            }
        }

        Ok(config)
    }

    pub fn topology(&self) -> Result<Topology, ConfigError> {
        Ok(Topology::from_floor_sizes(&self.floor_sizes)?)
    }
}

fn parse<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.addr.to_string(), "127.0.0.1:5000");
        assert_eq!(config.cors_origin, None);
        assert_eq!(config.topology().unwrap().len(), 97);
    }

    #[test]
    fn reads_all_variables() {
        let config = Config::from_lookup(lookup(&[
            ("HOTEL_HOST", "0.0.0.0"),
            ("HOTEL_PORT", "5000"),
            ("HOTEL_FLOOR_SIZES", "3, 2,4"),
            ("HOTEL_SEED", "42"),
            ("HOTEL_DEFAULT_RATE", "0.5"),
        ]))
        .unwrap();
        assert_eq!(config.addr.to_string(), "0.0.0.0:5000");
        assert_eq!(config.floor_sizes, vec![3, 2, 4]);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.default_rate, 0.5);
        assert_eq!(config.topology().unwrap().len(), 9);
    }

    #[test]
    fn falls_back_to_plain_port() {
        let config = Config::from_lookup(lookup(&[("PORT", "9000")])).unwrap();
        assert_eq!(config.addr.port(), 9000);

        let config = Config::from_lookup(lookup(&[("PORT", "9000"), ("HOTEL_PORT", "9001")])).unwrap();
        assert_eq!(config.addr.port(), 9001);
    }

    #[test]
    fn rejects_malformed_values() {
        let err = Config::from_lookup(lookup(&[("HOTEL_PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "HOTEL_PORT", .. }));

        let err = Config::from_lookup(lookup(&[("HOTEL_DEFAULT_RATE", "1.2")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "HOTEL_DEFAULT_RATE", .. }));

        let err = Config::from_lookup(lookup(&[("HOTEL_FLOOR_SIZES", "10,x")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "HOTEL_FLOOR_SIZES", .. }));
    }

    #[test]
    fn cors_origin_variables() {
        let config = Config::from_lookup(lookup(&[("CORS_ORIGIN", "http://localhost:3000")])).unwrap();
        assert_eq!(config.cors_origin.as_deref(), Some("http://localhost:3000"));

        let config = Config::from_lookup(lookup(&[
            ("CORS_ORIGIN", "http://a.example"),
            ("HOTEL_CORS_ORIGIN", "http://b.example"),
        ]))
        .unwrap();
        assert_eq!(config.cors_origin.as_deref(), Some("http://b.example"));

        let config = Config::from_lookup(lookup(&[("CORS_ORIGIN", "*")])).unwrap();
        assert_eq!(config.cors_origin, None);

        let err = Config::from_lookup(lookup(&[("HOTEL_CORS_ORIGIN", "bad\norigin")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "HOTEL_CORS_ORIGIN", .. }));
    }

    #[test]
    fn oversized_floor_is_a_layout_error() {
        let config = Config::from_lookup(lookup(&[("HOTEL_FLOOR_SIZES", "120")])).unwrap();
        assert!(matches!(config.topology(), Err(ConfigError::Layout(_))));
    }
}
