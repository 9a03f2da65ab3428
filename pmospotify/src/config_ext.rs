//! Extension pour intégrer la configuration Spotify dans pmoconfig
//!
//! Ce module fournit le trait `SpotifyConfigExt` qui ajoute à
//! `pmoconfig::Config` les accesseurs des credentials de l'API Web. Les
//! credentials ne sont jamais embarqués dans le binaire : une valeur
//! absente ou vide est une erreur de configuration à corriger par
//! l'utilisateur.

use anyhow::{Result, anyhow};
use pmoconfig::Config;
use serde_yaml::Value;

/// Trait d'extension pour les credentials de l'API Spotify
///
/// # Exemple
///
/// ```rust,ignore
/// use pmoconfig::Config;
/// use pmospotify::SpotifyConfigExt;
///
/// let config = Config::load_config("")?;
/// let (client_id, client_secret) = config.get_spotify_api_credentials()?;
/// ```
pub trait SpotifyConfigExt {
    /// Récupère le client id de l'API Spotify
    ///
    /// # Errors
    ///
    /// Retourne une erreur si le client id n'est pas configuré
    fn get_spotify_client_id(&self) -> Result<String>;

    /// Définit le client id de l'API Spotify
    fn set_spotify_client_id(&self, client_id: &str) -> Result<()>;

    /// Récupère le client secret de l'API Spotify
    ///
    /// # Errors
    ///
    /// Retourne une erreur si le client secret n'est pas configuré
    fn get_spotify_client_secret(&self) -> Result<String>;

    /// Définit le client secret de l'API Spotify
    fn set_spotify_client_secret(&self, client_secret: &str) -> Result<()>;

    /// Récupère le couple (client id, client secret)
    ///
    /// # Errors
    ///
    /// Retourne une erreur si l'un des deux n'est pas configuré
    fn get_spotify_api_credentials(&self) -> Result<(String, String)>;
}

impl SpotifyConfigExt for Config {
    fn get_spotify_client_id(&self) -> Result<String> {
        match self.get_value(&["accounts", "spotify", "client_id"]) {
            Ok(Value::String(s)) if !s.is_empty() => Ok(s),
            _ => Err(anyhow!("Spotify client id not configured")),
        }
    }

    fn set_spotify_client_id(&self, client_id: &str) -> Result<()> {
        self.set_value(
            &["accounts", "spotify", "client_id"],
            Value::String(client_id.to_string()),
        )
    }

    fn get_spotify_client_secret(&self) -> Result<String> {
        match self.get_value(&["accounts", "spotify", "client_secret"]) {
            Ok(Value::String(s)) if !s.is_empty() => Ok(s),
            _ => Err(anyhow!("Spotify client secret not configured")),
        }
    }

    fn set_spotify_client_secret(&self, client_secret: &str) -> Result<()> {
        self.set_value(
            &["accounts", "spotify", "client_secret"],
            Value::String(client_secret.to_string()),
        )
    }

    fn get_spotify_api_credentials(&self) -> Result<(String, String)> {
        let client_id = self.get_spotify_client_id()?;
        let client_secret = self.get_spotify_client_secret()?;
        Ok((client_id, client_secret))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> (Config, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_config(dir.path().to_str().unwrap()).unwrap();
        (config, dir)
    }

    #[test]
    fn empty_credentials_are_a_configuration_error() {
        let (config, _dir) = config();
        assert!(config.get_spotify_client_id().is_err());
        assert!(config.get_spotify_api_credentials().is_err());
    }

    #[test]
    fn credentials_round_trip() {
        let (config, _dir) = config();
        config.set_spotify_client_id("my-id").unwrap();
        config.set_spotify_client_secret("my-secret").unwrap();

        let (client_id, client_secret) = config.get_spotify_api_credentials().unwrap();
        assert_eq!(client_id, "my-id");
        assert_eq!(client_secret, "my-secret");
    }
}
