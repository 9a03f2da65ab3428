//! Gestion des erreurs pour le client de bus

use thiserror::Error;

/// Type Result personnalisé pour pmomqtt
pub type Result<T> = std::result::Result<T, BusError>;

/// Erreurs possibles lors de l'utilisation du bus de messages
#[derive(Error, Debug)]
pub enum BusError {
    /// Le broker est injoignable au niveau transport (TCP)
    #[error("Broker unreachable: {0}")]
    BrokerUnreachable(String),

    /// Le broker a refusé la connexion (CONNACK négatif)
    #[error("Connection refused by broker: {0}")]
    ConnectionRefused(String),

    /// Publication impossible, la connexion n'est plus active
    #[error("Publish failed: {0}")]
    PublishFailed(String),

    /// Abonnement impossible
    #[error("Subscribe failed: {0}")]
    SubscribeFailed(String),
}

impl BusError {
    /// Vérifie si l'erreur est une erreur de connexion au broker,
    /// quelle que soit la couche (transport ou CONNACK)
    pub fn is_connect_error(&self) -> bool {
        matches!(
            self,
            BusError::BrokerUnreachable(_) | BusError::ConnectionRefused(_)
        )
    }
}
