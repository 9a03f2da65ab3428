//! Gestion des erreurs pour le client Spotify

use thiserror::Error;

/// Type Result personnalisé pour pmospotify
pub type Result<T> = std::result::Result<T, SpotifyError>;

/// Erreurs possibles lors d'une résolution via l'API Spotify
#[derive(Error, Debug)]
pub enum SpotifyError {
    /// Erreur d'authentification (credentials invalides)
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Ressource non trouvée (track, artiste)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Erreur HTTP
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Erreur de parsing JSON
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Erreur de configuration (anyhow)
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    /// Erreur de configuration Spotify (credentials manquants, etc.)
    #[error("Spotify configuration error: {0}")]
    Configuration(String),

    /// Erreur de l'API Spotify
    #[error("Spotify API error (code {code}): {message}")]
    ApiError { code: u16, message: String },

    /// Quota dépassé (rate limiting)
    #[error("Rate limit exceeded, please try again later")]
    RateLimitExceeded,
}

impl SpotifyError {
    /// Crée une erreur API depuis un code de statut HTTP et un message
    pub fn from_status_code(code: u16, message: impl Into<String>) -> Self {
        match code {
            401 | 403 => Self::Unauthorized(message.into()),
            404 => Self::NotFound(message.into()),
            429 => Self::RateLimitExceeded,
            _ => Self::ApiError {
                code,
                message: message.into(),
            },
        }
    }

    /// Vérifie si l'erreur est une erreur de credentials
    pub fn is_auth_error(&self) -> bool {
        matches!(self, SpotifyError::Unauthorized(_))
    }
}
