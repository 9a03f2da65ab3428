//! # pmospotify - Résolveur de métadonnées Spotify pour PMOJukebox
//!
//! Cette crate fournit un client Rust pour l'API Web Spotify, utilisé pour
//! résoudre un identifiant de piste opaque (reçu sur le bus d'événements)
//! en métadonnées riches : titre, liste ordonnée des artistes, album et
//! URLs de pochette.
//!
//! ## Vue d'ensemble
//!
//! - Authentification "client credentials" avec renouvellement automatique
//!   du token en mémoire
//! - Résolution d'une piste (`/tracks/{id}`) et d'artistes (`/artists/{id}`)
//! - Une requête distante par appel, aucun cache côté résolveur : la
//!   dé-duplication appartient à l'appelant (voir `pmoconnect::TrackDedup`)
//!
//! Les credentials (client id / secret) viennent toujours de la
//! configuration, jamais de constantes embarquées.
//!
//! ## Structure des modules
//!
//! ```text
//! pmospotify/
//! ├── src/
//! │   ├── lib.rs              # Module principal (ce fichier)
//! │   ├── client.rs           # Client Spotify principal
//! │   ├── models.rs           # Structures de données
//! │   ├── api/
//! │   │   ├── mod.rs          # API client bas-niveau
//! │   │   ├── auth.rs         # Authentification client credentials
//! │   │   └── catalog.rs      # Accès au catalogue (tracks, artistes)
//! │   ├── config_ext.rs       # Extension pmoconfig
//! │   └── error.rs            # Gestion des erreurs
//! ```
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use pmoconfig::Config;
//! use pmospotify::SpotifyClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load_config("")?;
//!     let client = SpotifyClient::from_config(&config)?;
//!
//!     let track = client.resolve_track("3n3Ppam7vgaVa1iaRUc9Lp").await?;
//!     println!("{} - {}", track.artist_names(), track.title);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Gestion des erreurs
//!
//! Toute erreur de résolution est un [`SpotifyError`] typé (`thiserror`),
//! propagé à l'appelant qui décide du repli d'affichage.

pub mod api;
pub mod client;
pub mod config_ext;
pub mod error;
pub mod models;

pub use client::SpotifyClient;
pub use config_ext::SpotifyConfigExt;
pub use error::{Result, SpotifyError};
pub use models::{ArtistMetadata, ArtistRef, Image, TrackMetadata};
