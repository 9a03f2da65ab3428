//! # pmoconnect - Superviseur Spotify Connect pour PMOJukebox
//!
//! Cette crate est le cœur du pont d'événements : elle possède le cycle de
//! vie du démon de lecture (librespot) et l'abonnement longue durée au bus
//! MQTT, traduit les messages bruts du bus en événements typés, et les
//! distribue à des observateurs enregistrés.
//!
//! ## Architecture
//!
//! Trois processus indépendants coopèrent sans mémoire partagée :
//! - le processus superviseur (cette crate, hébergée par l'application) ;
//! - librespot, lancé et tué par le superviseur, jamais contacté
//!   directement ;
//! - la gateway (`pmogateway`), lancée par librespot à chaque événement,
//!   qui publie sur le bus puis disparaît.
//!
//! Le superviseur s'abonne au wildcard `spotify/#` ; le classifieur ne
//! regarde que le topic : `spotify/track_event` devient
//! [`ConnectEvent::Track`], `spotify/player_event` devient
//! [`ConnectEvent::Player`], tout autre topic est journalisé puis ignoré.
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use pmoconfig::Config;
//! use pmoconnect::{ConnectEvent, ConnectObserver, ConnectServer};
//! use std::sync::Arc;
//!
//! struct Printer;
//!
//! impl ConnectObserver for Printer {
//!     fn on_event(&self, event: &ConnectEvent) -> anyhow::Result<()> {
//!         println!("{event:?}");
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(Config::load_config("")?);
//!     let mut server = ConnectServer::new(config);
//!     server.subscribe_observer(Arc::new(Printer));
//!     server.start().await?;
//!     tokio::signal::ctrl_c().await?;
//!     server.stop().await?;
//!     Ok(())
//! }
//! ```

pub mod config_ext;
pub mod daemon;
pub mod error;
pub mod events;
pub mod observer;
pub mod server;

pub use config_ext::ConnectConfigExt;
pub use daemon::{LibrespotProcess, LibrespotSettings};
pub use error::{ConnectError, Result};
pub use events::{ConnectEvent, PlayerState, TrackDedup};
pub use observer::{ConnectObserver, ObserverId, ObserverRegistry};
pub use server::ConnectServer;
