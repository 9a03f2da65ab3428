//! # pmomqtt - Client MQTT pour PMOJukebox
//!
//! Cette crate fournit le client de bus de messages utilisé des deux côtés
//! du pont d'événements Spotify Connect :
//! - côté superviseur : une connexion longue durée qui s'abonne au wildcard
//!   `spotify/#` et reçoit les événements publiés par la gateway ;
//! - côté gateway : une connexion éphémère qui publie un ou deux messages
//!   puis se déconnecte.
//!
//! La livraison est "au plus une fois" (QoS 0), sans ordre garanti entre
//! topics. L'ordre au sein d'un même topic depuis un même éditeur est
//! best-effort seulement : aucun consommateur ne doit s'y fier.
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use pmomqtt::{BusClient, TOPIC_PLAYER_EVENT, TOPIC_WILDCARD};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut bus = BusClient::connect("localhost", 1883, Duration::from_secs(60)).await?;
//!     bus.subscribe(TOPIC_WILDCARD).await?;
//!     bus.publish(TOPIC_PLAYER_EVENT, b"started".to_vec()).await?;
//!
//!     let mut messages = bus.messages().expect("inbound stream");
//!     if let Some(msg) = messages.recv().await {
//!         println!("{}: {:?}", msg.topic, msg.payload);
//!     }
//!
//!     bus.disconnect().await;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config_ext;
pub mod error;

pub use client::{BusClient, BusMessage};
pub use config_ext::MqttConfigExt;
pub use error::{BusError, Result};

/// Topic portant l'identifiant de la piste en cours (payload UTF-8 opaque)
pub const TOPIC_TRACK_EVENT: &str = "spotify/track_event";

/// Topic portant l'état du lecteur ("started", "stopped", "playing", ...)
pub const TOPIC_PLAYER_EVENT: &str = "spotify/player_event";

/// Wildcard d'abonnement couvrant tous les topics Spotify
pub const TOPIC_WILDCARD: &str = "spotify/#";
