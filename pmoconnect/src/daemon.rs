//! Lancement et arrêt du démon de lecture librespot
//!
//! Le superviseur ne parle jamais à librespot : il le lance avec la bonne
//! ligne de commande, vérifie qu'il a survécu à son démarrage, et le tue à
//! l'arrêt. Tout le dialogue passe par le hook `--onevent` et le bus MQTT.

use crate::config_ext::ConnectConfigExt;
use crate::error::{ConnectError, Result};
use pmoconfig::Config;
use std::process::{Child, Command, Stdio};
use tracing::{debug, info, warn};

/// Paramètres de lancement de librespot, extraits de la configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibrespotSettings {
    pub binary: String,
    pub device_name: String,
    pub bitrate: u16,
    pub cache_dir: String,
    pub initial_volume: u8,
    pub device_type: String,
    pub event_gateway: String,
    pub normalization: bool,
}

impl LibrespotSettings {
    /// Construit les paramètres depuis la section `spotify` de la
    /// configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            binary: config.get_librespot_binary(),
            device_name: config.get_device_name(),
            bitrate: config.get_bitrate(),
            cache_dir: config.get_cache_dir()?,
            initial_volume: config.get_initial_volume(),
            device_type: config.get_device_type(),
            event_gateway: config.get_event_gateway(),
            normalization: config.get_normalization(),
        })
    }

    /// Arguments de la ligne de commande librespot
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "-n".to_string(),
            self.device_name.clone(),
            "-b".to_string(),
            self.bitrate.to_string(),
            "-c".to_string(),
            self.cache_dir.clone(),
            "--initial-volume".to_string(),
            self.initial_volume.to_string(),
            "--device-type".to_string(),
            self.device_type.clone(),
            "--onevent".to_string(),
            self.event_gateway.clone(),
        ];
        if self.normalization {
            args.push("--enable-volume-normalisation".to_string());
        }
        args
    }
}

/// Handle sur un processus librespot en cours d'exécution
#[derive(Debug)]
pub struct LibrespotProcess {
    child: Child,
    settings: LibrespotSettings,
}

impl LibrespotProcess {
    /// Lance librespot avec les paramètres donnés
    ///
    /// Vérifie immédiatement après le lancement que le processus est
    /// toujours vivant : un binaire qui refuse ses arguments meurt dans les
    /// premières millisecondes, et mieux vaut le signaler ici qu'attendre
    /// un endpoint Connect qui n'apparaîtra jamais.
    pub fn spawn(settings: LibrespotSettings) -> Result<Self> {
        let args = settings.to_args();
        debug!(binary = %settings.binary, ?args, "Launching playback daemon");

        // Personne ne draine la sortie du démon : la laisser dans un pipe
        // finirait par le bloquer une fois le tampon plein
        let child = Command::new(&settings.binary)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| {
                ConnectError::ProcessLaunchFailed(format!(
                    "{}: {}",
                    settings.binary, err
                ))
            })?;

        let mut process = Self { child, settings };
        if let Some(status) = process.try_status()? {
            return Err(ConnectError::ProcessLaunchFailed(format!(
                "{} exited immediately with {}",
                process.settings.binary, status
            )));
        }

        info!(
            pid = process.child.id(),
            device = %process.settings.device_name,
            "Playback daemon started"
        );
        Ok(process)
    }

    /// Identifiant du processus
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Statut de sortie si le processus est déjà mort, `None` sinon
    pub fn try_status(&mut self) -> Result<Option<std::process::ExitStatus>> {
        self.child
            .try_wait()
            .map_err(|err| ConnectError::ProcessLaunchFailed(err.to_string()))
    }

    /// Tue le processus et attend sa disparition
    ///
    /// Idempotent : tuer un processus déjà mort n'est pas une erreur.
    pub fn kill(&mut self) {
        if let Err(err) = self.child.kill() {
            debug!(pid = self.child.id(), "Kill skipped: {}", err);
        }
        match self.child.wait() {
            Ok(status) => info!(pid = self.child.id(), %status, "Playback daemon stopped"),
            Err(err) => warn!(pid = self.child.id(), "Failed to reap playback daemon: {}", err),
        }
    }
}

impl Drop for LibrespotProcess {
    fn drop(&mut self) {
        // Le superviseur ne doit jamais laisser un librespot orphelin
        if matches!(self.child.try_wait(), Ok(None)) {
            self.kill();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> LibrespotSettings {
        LibrespotSettings {
            binary: "/usr/bin/librespot".to_string(),
            device_name: "salon".to_string(),
            bitrate: 320,
            cache_dir: "/tmp/spotify_cache".to_string(),
            initial_volume: 75,
            device_type: "avr".to_string(),
            event_gateway: "/usr/bin/pmogateway".to_string(),
            normalization: false,
        }
    }

    #[test]
    fn args_carry_every_configured_flag() {
        let args = settings().to_args();
        assert_eq!(
            args,
            vec![
                "-n",
                "salon",
                "-b",
                "320",
                "-c",
                "/tmp/spotify_cache",
                "--initial-volume",
                "75",
                "--device-type",
                "avr",
                "--onevent",
                "/usr/bin/pmogateway",
            ]
        );
    }

    #[test]
    fn normalization_adds_its_flag_last() {
        let mut settings = settings();
        settings.normalization = true;
        let args = settings.to_args();
        assert_eq!(
            args.last().map(String::as_str),
            Some("--enable-volume-normalisation")
        );
    }

    #[test]
    fn missing_binary_is_a_launch_failure() {
        let mut settings = settings();
        settings.binary = "/nonexistent/librespot".to_string();
        let err = LibrespotProcess::spawn(settings).unwrap_err();
        assert!(matches!(err, ConnectError::ProcessLaunchFailed(_)));
        assert!(err.to_string().contains("/nonexistent/librespot"));
    }
}
