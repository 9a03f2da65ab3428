//! # pmogateway - Gateway d'événements pour PMOJukebox
//!
//! Binaire one-shot lancé par librespot via son hook `--onevent` à chaque
//! événement de lecture. Il lit `PLAYER_EVENT` et `TRACK_ID` dans
//! l'environnement, publie sur le bus MQTT, et disparaît.
//!
//! Le contrat avec librespot est strict : quoi qu'il arrive (configuration
//! absente, broker injoignable, publication refusée), la gateway journalise
//! et sort avec le statut 0. Un événement perdu est perdu, sans retry ni
//! file d'attente.

use pmoconfig::Config;
use pmomqtt::{BusClient, MqttConfigExt, TOPIC_PLAYER_EVENT, TOPIC_TRACK_EVENT};
use tracing::{debug, error, info};

/// Événement de lecture reconstruit depuis l'environnement du hook
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct GatewayEvent {
    player_event: Option<String>,
    track_id: Option<String>,
}

impl GatewayEvent {
    /// Construit l'événement depuis les deux variables d'environnement
    ///
    /// Chacune peut être absente ou vide ; une valeur vide est traitée
    /// comme absente.
    fn from_env_parts(player_event: Option<String>, track_id: Option<String>) -> Self {
        Self {
            player_event: player_event.filter(|s| !s.trim().is_empty()),
            track_id: track_id.filter(|s| !s.trim().is_empty()),
        }
    }

    fn from_env() -> Self {
        Self::from_env_parts(
            std::env::var("PLAYER_EVENT").ok(),
            std::env::var("TRACK_ID").ok(),
        )
    }

    fn is_empty(&self) -> bool {
        self.player_event.is_none() && self.track_id.is_none()
    }
}

/// Publie l'événement sur le bus puis se déconnecte
async fn forward(event: GatewayEvent) -> anyhow::Result<()> {
    let config = Config::load_config("")?;
    let mut bus = BusClient::connect(
        &config.get_mqtt_host(),
        config.get_mqtt_port(),
        config.get_mqtt_keep_alive(),
    )
    .await?;

    if let Some(track_id) = &event.track_id {
        bus.publish(TOPIC_TRACK_EVENT, track_id.clone().into_bytes())
            .await?;
        info!(track_id = %track_id, "Track event forwarded");
    }
    if let Some(state) = &event.player_event {
        bus.publish(TOPIC_PLAYER_EVENT, state.clone().into_bytes())
            .await?;
        info!(state = %state, "Player event forwarded");
    }

    bus.disconnect().await;
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let event = GatewayEvent::from_env();
    if event.is_empty() {
        debug!("No PLAYER_EVENT nor TRACK_ID in environment, nothing to forward");
        return;
    }

    // Jamais de code de sortie non nul : librespot ne doit pas pâtir
    // d'une gateway en échec
    if let Err(err) = forward(event).await {
        error!("Failed to forward event: {:#}", err);
    }
}
