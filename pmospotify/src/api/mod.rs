//! Couche d'accès à l'API Web Spotify
//!
//! Ce module fournit une interface bas-niveau pour communiquer avec l'API
//! Spotify : requêtes HTTP, gestion des statuts d'erreur et parsing JSON.

pub mod auth;
pub mod catalog;

use crate::error::{Result, SpotifyError};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// URL de base de l'API Web Spotify
const API_BASE_URL: &str = "https://api.spotify.com/v1";

/// URL du endpoint de tokens (client credentials)
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Client API bas-niveau pour communiquer avec Spotify
pub struct SpotifyApi {
    /// Client HTTP
    client: Client,
    /// URL de base du catalogue
    api_base: String,
    /// URL du endpoint de tokens
    token_url: String,
    /// Identifiant d'application
    client_id: String,
    /// Secret d'application
    client_secret: String,
}

impl SpotifyApi {
    /// Crée une nouvelle instance de l'API avec les URLs de production
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Result<Self> {
        Self::with_base_urls(API_BASE_URL, TOKEN_URL, client_id, client_secret)
    }

    /// Crée une instance avec des URLs personnalisées (utilisé par les tests)
    pub fn with_base_urls(
        api_base: impl Into<String>,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            api_base: api_base.into(),
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        })
    }

    /// Retourne l'identifiant d'application
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub(crate) fn token_url(&self) -> &str {
        &self.token_url
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    pub(crate) fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Effectue une requête GET authentifiée sur le catalogue
    pub(crate) async fn get<T: DeserializeOwned>(&self, endpoint: &str, token: &str) -> Result<T> {
        let url = format!("{}{}", self.api_base, endpoint);
        debug!("GET {}", url);

        let response = self.client.get(&url).bearer_auth(token).send().await?;
        self.handle_response(response).await
    }

    /// Traite la réponse HTTP
    pub(crate) async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        let status_code = status.as_u16();

        debug!("Response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = extract_error_message(&error_text);
            warn!("API error ({}): {}", status_code, message);
            return Err(SpotifyError::from_status_code(status_code, message));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!("Failed to parse response: {}", e);
            SpotifyError::JsonParse(e)
        })
    }
}

/// Extrait le message d'erreur d'un corps de réponse Spotify
///
/// Les erreurs du catalogue arrivent en `{"error": {"status", "message"}}`,
/// celles du endpoint de tokens en `{"error", "error_description"}`.
fn extract_error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if let Some(message) = json
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return message.to_string();
        }
        if let Some(description) = json.get("error_description").and_then(|m| m.as_str()) {
            return description.to_string();
        }
        if let Some(error) = json.get("error").and_then(|m| m.as_str()) {
            return error.to_string();
        }
    }
    body.to_string()
}
