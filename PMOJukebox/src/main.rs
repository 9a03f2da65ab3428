//! # PMOJukebox - Endpoint Spotify Connect supervisé
//!
//! Racine de composition : charge la configuration, câble explicitement le
//! résolveur de métadonnées et le superviseur, enregistre l'observateur
//! "now playing", puis tourne jusqu'à Ctrl+C.

use pmoconfig::Config;
use pmoconnect::{ConnectError, ConnectEvent, ConnectObserver, ConnectServer, TrackDedup};
use pmomqtt::MqttConfigExt;
use pmospotify::SpotifyClient;
use std::sync::{Arc, Mutex};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Observateur qui résout la piste en cours et la journalise
///
/// La vraie cible (l'interface graphique) est un collaborateur externe :
/// ici la métadonnée résolue part dans les logs. La dé-duplication évite de
/// re-résoudre la même piste quand le démon répète son identifiant.
struct NowPlayingObserver {
    resolver: Option<Arc<SpotifyClient>>,
    dedup: Mutex<TrackDedup>,
}

impl NowPlayingObserver {
    fn new(resolver: Option<Arc<SpotifyClient>>) -> Self {
        Self {
            resolver,
            dedup: Mutex::new(TrackDedup::new()),
        }
    }
}

impl ConnectObserver for NowPlayingObserver {
    fn on_event(&self, event: &ConnectEvent) -> anyhow::Result<()> {
        match event {
            ConnectEvent::Player { state } => {
                info!(%state, "Player state changed");
            }
            ConnectEvent::Track { track_id } => {
                if !self.dedup.lock().unwrap().is_new(track_id) {
                    return Ok(());
                }
                let Some(resolver) = self.resolver.clone() else {
                    info!(track_id = %track_id, "Now playing (metadata resolution disabled)");
                    return Ok(());
                };
                // La résolution est distante : on la détache de la tâche de
                // livraison pour ne pas retarder les autres observateurs
                let track_id = track_id.clone();
                tokio::spawn(async move {
                    match resolver.resolve_track(&track_id).await {
                        Ok(track) => info!(
                            track_id = %track.id,
                            title = %track.title,
                            artists = %track.artist_names(),
                            album = %track.album,
                            "Now playing"
                        ),
                        Err(err) => {
                            warn!(track_id = %track_id, "Failed to resolve track: {}", err)
                        }
                    }
                });
            }
        }
        Ok(())
    }
}

fn init_logging(config: &Config) {
    let enable_console = config.get_log_enable_console().unwrap_or(true);
    if !enable_console {
        return;
    }
    let min_level = config
        .get_log_min_level()
        .unwrap_or_else(|_| "INFO".to_string());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(min_level.to_lowercase()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(Config::load_config("")?);
    init_logging(&config);

    // Le résolveur est optionnel : sans identifiants Spotify configurés,
    // le jukebox tourne quand même, sans métadonnées
    let resolver = match SpotifyClient::from_config(&config) {
        Ok(client) => Some(Arc::new(client)),
        Err(err) => {
            warn!(
                "Spotify API credentials not configured ({}), metadata resolution disabled",
                err
            );
            None
        }
    };

    let mut server = ConnectServer::new(Arc::clone(&config));
    server.subscribe_observer(Arc::new(NowPlayingObserver::new(resolver)));

    if let Err(err) = server.start().await {
        match &err {
            ConnectError::BrokerConnectionRefused(_) => {
                error!(
                    host = %config.get_mqtt_host(),
                    port = config.get_mqtt_port(),
                    "Cannot reach the MQTT broker, is it running? ({})",
                    err
                );
            }
            _ => error!("Failed to start the Connect server: {}", err),
        }
        return Err(err.into());
    }

    info!("PMOJukebox running, press Ctrl+C to stop");
    tokio::signal::ctrl_c().await?;

    server.stop().await?;
    info!("Goodbye");
    Ok(())
}
