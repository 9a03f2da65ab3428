//! Extension pour intégrer les paramètres du démon de lecture dans pmoconfig
//!
//! Ce module fournit le trait `ConnectConfigExt` qui ajoute à
//! `pmoconfig::Config` les accesseurs de la section `spotify` : identité de
//! l'endpoint Connect, qualité audio, chemins des binaires.

use anyhow::Result;
use pmoconfig::Config;
use serde_yaml::Value;
use tracing::warn;

const DEFAULT_DEVICE_NAME: &str = "pmojukebox";
const DEFAULT_BITRATE: u16 = 320;
const DEFAULT_CACHE_DIR: &str = "spotify_cache";
const DEFAULT_INITIAL_VOLUME: u8 = 75;
const DEFAULT_DEVICE_TYPE: &str = "avr";
const DEFAULT_LIBRESPOT_BINARY: &str = "/usr/bin/librespot";
const DEFAULT_EVENT_GATEWAY: &str = "/usr/bin/pmogateway";

/// Trait d'extension pour les paramètres Spotify Connect dans pmoconfig
pub trait ConnectConfigExt {
    /// Nom de l'endpoint visible dans les applications Spotify
    /// (défaut : `pmojukebox`)
    fn get_device_name(&self) -> String;

    /// Définit le nom de l'endpoint
    fn set_device_name(&self, name: &str) -> Result<()>;

    /// Débit audio en kbit/s (défaut : 320)
    fn get_bitrate(&self) -> u16;

    /// Répertoire de cache de librespot, créé si nécessaire
    fn get_cache_dir(&self) -> Result<String>;

    /// Volume initial en pourcentage (défaut : 75)
    fn get_initial_volume(&self) -> u8;

    /// Type d'appareil annoncé à Spotify (défaut : `avr`)
    fn get_device_type(&self) -> String;

    /// Normalisation du volume activée (défaut : non)
    fn get_normalization(&self) -> bool;

    /// Chemin du binaire librespot
    fn get_librespot_binary(&self) -> String;

    /// Chemin du binaire gateway passé à `--onevent`
    fn get_event_gateway(&self) -> String;
}

fn get_string(config: &Config, path: &[&str], default: &str) -> String {
    match config.get_value(path) {
        Ok(Value::String(s)) if !s.is_empty() => s,
        Ok(_) => {
            warn!(
                "Config value {} is not a string or empty, using default {}",
                path.join("."),
                default
            );
            default.to_string()
        }
        Err(err) => {
            warn!(
                "Failed to get {}: {}, using default {}",
                path.join("."),
                err,
                default
            );
            default.to_string()
        }
    }
}

fn get_number(config: &Config, path: &[&str], default: u64) -> u64 {
    match config.get_value(path) {
        Ok(Value::Number(n)) if n.is_u64() => n.as_u64().unwrap(),
        Ok(Value::String(s)) => match s.parse::<u64>() {
            Ok(v) => v,
            Err(_) => {
                warn!(
                    "Invalid number '{}' for {}, using default {}",
                    s,
                    path.join("."),
                    default
                );
                default
            }
        },
        _ => default,
    }
}

impl ConnectConfigExt for Config {
    fn get_device_name(&self) -> String {
        get_string(self, &["spotify", "name"], DEFAULT_DEVICE_NAME)
    }

    fn set_device_name(&self, name: &str) -> Result<()> {
        self.set_value(&["spotify", "name"], Value::String(name.to_string()))
    }

    fn get_bitrate(&self) -> u16 {
        // librespot n'accepte que 96, 160 et 320
        let bitrate = get_number(self, &["spotify", "bitrate"], DEFAULT_BITRATE as u64);
        match bitrate {
            96 | 160 | 320 => bitrate as u16,
            other => {
                warn!("Unsupported bitrate {}, using {}", other, DEFAULT_BITRATE);
                DEFAULT_BITRATE
            }
        }
    }

    fn get_cache_dir(&self) -> Result<String> {
        self.get_managed_dir(&["spotify", "cache"], DEFAULT_CACHE_DIR)
    }

    fn get_initial_volume(&self) -> u8 {
        let volume = get_number(
            self,
            &["spotify", "initial_volume"],
            DEFAULT_INITIAL_VOLUME as u64,
        );
        if volume > 100 {
            warn!(
                "Initial volume {} out of range, using {}",
                volume, DEFAULT_INITIAL_VOLUME
            );
            DEFAULT_INITIAL_VOLUME
        } else {
            volume as u8
        }
    }

    fn get_device_type(&self) -> String {
        get_string(self, &["spotify", "device_type"], DEFAULT_DEVICE_TYPE)
    }

    fn get_normalization(&self) -> bool {
        match self.get_value(&["spotify", "normalization"]) {
            Ok(Value::Bool(b)) => b,
            _ => false,
        }
    }

    fn get_librespot_binary(&self) -> String {
        get_string(self, &["spotify", "binary"], DEFAULT_LIBRESPOT_BINARY)
    }

    fn get_event_gateway(&self) -> String {
        get_string(self, &["spotify", "event_gateway"], DEFAULT_EVENT_GATEWAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Number;

    fn config() -> (Config, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        (config, dir)
    }

    #[test]
    fn defaults_come_from_embedded_config() {
        let (config, _dir) = config();
        assert_eq!(config.get_device_name(), "pmojukebox");
        assert_eq!(config.get_bitrate(), 320);
        assert_eq!(config.get_initial_volume(), 75);
        assert_eq!(config.get_device_type(), "avr");
        assert!(!config.get_normalization());
        assert_eq!(config.get_librespot_binary(), "/usr/bin/librespot");
        assert_eq!(config.get_event_gateway(), "/usr/bin/pmogateway");
    }

    #[test]
    fn device_name_round_trips() {
        let (config, _dir) = config();
        config.set_device_name("salon").unwrap();
        assert_eq!(config.get_device_name(), "salon");
    }

    #[test]
    fn invalid_bitrate_falls_back_to_default() {
        let (config, _dir) = config();
        config
            .set_value(&["spotify", "bitrate"], Value::Number(Number::from(192)))
            .unwrap();
        assert_eq!(config.get_bitrate(), 320);
    }

    #[test]
    fn cache_dir_is_created_under_config_dir() {
        let (config, dir) = config();
        let cache = config.get_cache_dir().unwrap();
        assert!(std::path::Path::new(&cache).is_dir());
        assert!(cache.starts_with(dir.path().to_str().unwrap()));
    }
}
