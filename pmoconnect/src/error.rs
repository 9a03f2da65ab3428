//! Gestion des erreurs pour le superviseur Spotify Connect

use pmomqtt::BusError;
use thiserror::Error;

/// Type Result personnalisé pour pmoconnect
pub type Result<T> = std::result::Result<T, ConnectError>;

/// Erreurs possibles lors de la supervision du démon de lecture
#[derive(Error, Debug)]
pub enum ConnectError {
    /// Connexion au broker MQTT impossible au démarrage
    ///
    /// Fatale pour `start()` : le processus de lecture vient d'être tué
    /// (rollback), car tourner sans canal d'événements signifierait perdre
    /// silencieusement chaque notification.
    #[error("Unable to connect to MQTT broker: {0}")]
    BrokerConnectionRefused(#[source] BusError),

    /// Le démon de lecture n'a pas pu être lancé, ou est mort
    /// immédiatement après son lancement
    #[error("Failed to launch playback daemon: {0}")]
    ProcessLaunchFailed(String),

    /// `start()` appelé alors que le superviseur tourne déjà
    #[error("Connect server is already running")]
    AlreadyRunning,

    /// `stop()` appelé sans `start()` préalable réussi
    #[error("Connect server is not running")]
    NotRunning,

    /// Erreur du bus hors phase de connexion
    #[error("Bus error: {0}")]
    Bus(#[from] BusError),

    /// Erreur de configuration
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),
}
