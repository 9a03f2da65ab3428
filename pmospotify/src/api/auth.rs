//! Authentification "client credentials" auprès de Spotify
//!
//! Le flux est celui de l'API Web : POST sur le endpoint de tokens avec
//! `grant_type=client_credentials` et une autorisation Basic construite
//! depuis le couple client id / secret. Le token obtenu n'est lié à aucun
//! utilisateur et suffit pour les lectures de catalogue.

use super::SpotifyApi;
use crate::error::Result;
use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::debug;

/// Marge de renouvellement avant expiration réelle du token
const RENEW_MARGIN_SECS: i64 = 60;

/// Réponse du endpoint de tokens
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[allow(dead_code)]
    token_type: String,
    expires_in: i64,
}

/// Token d'accès avec son échéance
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Vrai si le token est expiré ou sur le point de l'être
    pub fn needs_renewal(&self) -> bool {
        Utc::now() + Duration::seconds(RENEW_MARGIN_SECS) >= self.expires_at
    }
}

impl SpotifyApi {
    /// Demande un nouveau token d'accès
    pub(crate) async fn request_token(&self) -> Result<AccessToken> {
        let basic = STANDARD.encode(format!("{}:{}", self.client_id(), self.client_secret()));

        debug!("POST {}", self.token_url());
        let response = self
            .http()
            .post(self.token_url())
            .header("Authorization", format!("Basic {basic}"))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let token: TokenResponse = self.handle_response(response).await?;
        Ok(AccessToken {
            token: token.access_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_does_not_need_renewal() {
        let token = AccessToken {
            token: "abc".into(),
            expires_at: Utc::now() + Duration::seconds(3600),
        };
        assert!(!token.needs_renewal());
    }

    #[test]
    fn token_close_to_expiry_needs_renewal() {
        let token = AccessToken {
            token: "abc".into(),
            expires_at: Utc::now() + Duration::seconds(10),
        };
        assert!(token.needs_renewal());
    }
}
