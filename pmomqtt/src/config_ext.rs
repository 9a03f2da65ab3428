//! Extension pour intégrer la configuration du broker dans pmoconfig
//!
//! Ce module fournit le trait `MqttConfigExt` qui ajoute à
//! `pmoconfig::Config` les accesseurs des paramètres du broker MQTT,
//! utilisés à la fois par le superviseur et par la gateway.

use anyhow::Result;
use pmoconfig::Config;
use serde_yaml::{Number, Value};
use std::time::Duration;
use tracing::warn;

const DEFAULT_MQTT_HOST: &str = "localhost";
const DEFAULT_MQTT_PORT: u16 = 1883;
const DEFAULT_MQTT_KEEP_ALIVE_SECS: u64 = 60;

/// Trait d'extension pour les paramètres MQTT dans pmoconfig
pub trait MqttConfigExt {
    /// Récupère l'hôte du broker MQTT (défaut : `localhost`)
    fn get_mqtt_host(&self) -> String;

    /// Définit l'hôte du broker MQTT
    fn set_mqtt_host(&self, host: &str) -> Result<()>;

    /// Récupère le port du broker MQTT (défaut : 1883)
    fn get_mqtt_port(&self) -> u16;

    /// Définit le port du broker MQTT
    fn set_mqtt_port(&self, port: u16) -> Result<()>;

    /// Récupère l'intervalle de keep-alive MQTT (défaut : 60 s)
    fn get_mqtt_keep_alive(&self) -> Duration;
}

impl MqttConfigExt for Config {
    fn get_mqtt_host(&self) -> String {
        match self.get_value(&["system", "mqtt_host"]) {
            Ok(Value::String(s)) if !s.is_empty() => s,
            Ok(_) => {
                warn!(
                    "MQTT host is not a string or empty, using default {}",
                    DEFAULT_MQTT_HOST
                );
                DEFAULT_MQTT_HOST.to_string()
            }
            Err(err) => {
                warn!(
                    "Failed to get MQTT host: {}, using default {}",
                    err, DEFAULT_MQTT_HOST
                );
                DEFAULT_MQTT_HOST.to_string()
            }
        }
    }

    fn set_mqtt_host(&self, host: &str) -> Result<()> {
        self.set_value(&["system", "mqtt_host"], Value::String(host.to_string()))
    }

    fn get_mqtt_port(&self) -> u16 {
        match self.get_value(&["system", "mqtt_port"]) {
            Ok(Value::Number(n)) => match n.as_u64() {
                Some(port) if (1..=u64::from(u16::MAX)).contains(&port) => port as u16,
                _ => {
                    warn!(
                        "MQTT port {} out of range, using default {}",
                        n, DEFAULT_MQTT_PORT
                    );
                    DEFAULT_MQTT_PORT
                }
            },
            Ok(Value::String(s)) => match s.parse::<u16>() {
                Ok(port) => port,
                Err(_) => {
                    warn!("Invalid MQTT port '{}', using default {}", s, DEFAULT_MQTT_PORT);
                    DEFAULT_MQTT_PORT
                }
            },
            Ok(_) => {
                warn!(
                    "MQTT port not a number or string, using default {}",
                    DEFAULT_MQTT_PORT
                );
                DEFAULT_MQTT_PORT
            }
            Err(err) => {
                warn!(
                    "Failed to get MQTT port: {}, using default {}",
                    err, DEFAULT_MQTT_PORT
                );
                DEFAULT_MQTT_PORT
            }
        }
    }

    fn set_mqtt_port(&self, port: u16) -> Result<()> {
        let n = Number::from(port);
        self.set_value(&["system", "mqtt_port"], Value::Number(n))
    }

    fn get_mqtt_keep_alive(&self) -> Duration {
        let secs = match self.get_value(&["system", "mqtt_keep_alive"]) {
            Ok(Value::Number(n)) if n.is_u64() => n.as_u64().unwrap(),
            Ok(Value::Number(n)) if n.is_i64() && n.as_i64().unwrap() > 0 => {
                n.as_i64().unwrap() as u64
            }
            _ => DEFAULT_MQTT_KEEP_ALIVE_SECS,
        };
        Duration::from_secs(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> (Config, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        (config, dir)
    }

    #[test]
    fn defaults_come_from_embedded_config() {
        let (config, _dir) = config();
        assert_eq!(config.get_mqtt_host(), "localhost");
        assert_eq!(config.get_mqtt_port(), 1883);
        assert_eq!(config.get_mqtt_keep_alive(), Duration::from_secs(60));
    }

    #[test]
    fn out_of_range_port_falls_back_to_default() {
        let (config, _dir) = config();
        config
            .set_value(
                &["system", "mqtt_port"],
                Value::Number(Number::from(70000u32)),
            )
            .unwrap();
        assert_eq!(config.get_mqtt_port(), 1883);

        config
            .set_value(&["system", "mqtt_port"], Value::Number(Number::from(0u32)))
            .unwrap();
        assert_eq!(config.get_mqtt_port(), 1883);
    }

    #[test]
    fn setters_round_trip() {
        let (config, _dir) = config();
        config.set_mqtt_host("broker.local").unwrap();
        config.set_mqtt_port(8883).unwrap();
        assert_eq!(config.get_mqtt_host(), "broker.local");
        assert_eq!(config.get_mqtt_port(), 8883);
    }
}
