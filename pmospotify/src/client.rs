//! Client principal pour interagir avec l'API Spotify
//!
//! Ce module fournit le résolveur haut-niveau : une requête distante par
//! appel, aucun état entre deux résolutions hormis le token d'accès, qui
//! est renouvelé automatiquement à l'approche de son échéance.

use crate::api::SpotifyApi;
use crate::api::auth::AccessToken;
use crate::config_ext::SpotifyConfigExt;
use crate::error::Result;
use crate::models::{ArtistMetadata, TrackMetadata};
use pmoconfig::Config;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Client Spotify haut-niveau
pub struct SpotifyClient {
    /// API bas-niveau
    api: SpotifyApi,
    /// Token d'accès courant, renouvelé à la demande
    token: Mutex<Option<AccessToken>>,
}

impl SpotifyClient {
    /// Crée un nouveau client avec les credentials fournis
    ///
    /// L'authentification est paresseuse : le premier appel de résolution
    /// demande le token.
    pub fn new(client_id: &str, client_secret: &str) -> Result<Self> {
        Ok(Self::from_api(SpotifyApi::new(client_id, client_secret)?))
    }

    /// Crée un client depuis la configuration (section `accounts.spotify`)
    pub fn from_config(config: &Config) -> Result<Self> {
        let (client_id, client_secret) = config.get_spotify_api_credentials()?;
        info!("Creating Spotify client with client ID: {}", client_id);
        Self::new(&client_id, &client_secret)
    }

    /// Crée un client autour d'une API déjà construite (tests)
    pub fn from_api(api: SpotifyApi) -> Self {
        Self {
            api,
            token: Mutex::new(None),
        }
    }

    /// Retourne un token valide, en le renouvelant si nécessaire
    async fn bearer_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            if !token.needs_renewal() {
                return Ok(token.token.clone());
            }
        }

        info!("Requesting Spotify access token");
        let fresh = self.api.request_token().await?;
        let value = fresh.token.clone();
        *guard = Some(fresh);
        Ok(value)
    }

    /// Résout un identifiant de piste en métadonnées complètes
    ///
    /// Fonction pure de son entrée : une requête distante par appel, pas
    /// de cache. L'appelant est responsable de la dé-duplication des
    /// identifiants consécutifs identiques.
    ///
    /// # Errors
    ///
    /// Toute erreur de lookup (id inconnu, credentials invalides, panne
    /// réseau) est retournée en [`crate::SpotifyError`].
    pub async fn resolve_track(&self, track_id: &str) -> Result<TrackMetadata> {
        let token = self.bearer_token().await?;
        let track: TrackMetadata = self.api.get_track(&token, track_id).await?.into();
        debug!(track_id, title=%track.title, "Resolved track");
        Ok(track)
    }

    /// Résout une séquence ordonnée d'identifiants d'artistes
    ///
    /// Une requête par identifiant, dans l'ordre. Échoue à la première
    /// erreur sans retourner de résultat partiel.
    pub async fn resolve_artists(&self, artist_ids: &[String]) -> Result<Vec<ArtistMetadata>> {
        let token = self.bearer_token().await?;

        let mut artists = Vec::with_capacity(artist_ids.len());
        for artist_id in artist_ids {
            let artist: ArtistMetadata = self.api.get_artist(&token, artist_id).await?.into();
            debug!(artist_id, name=%artist.name, "Resolved artist");
            artists.push(artist);
        }
        Ok(artists)
    }
}
