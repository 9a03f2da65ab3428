//! Connexion au broker MQTT
//!
//! `BusClient` possède exclusivement sa connexion : le client rumqttc, la
//! tâche de fond qui pompe l'event loop, et le canal des messages entrants.
//! La connexion échoue immédiatement si le broker est injoignable ou refuse
//! le CONNACK, et `disconnect()` libère toujours la socket, y compris après
//! un échec de publication.

use crate::error::{BusError, Result};
use rumqttc::{
    AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS,
};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

/// Message entrant reçu sur un topic auquel le client est abonné
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// Connexion persistante au broker MQTT
///
/// Le détenteur d'un `BusClient` détient au plus une connexion vivante :
/// en ouvrir une seconde sans fermer la première est une erreur de
/// l'appelant, pas de cette crate.
pub struct BusClient {
    client: AsyncClient,
    driver: Option<JoinHandle<()>>,
    inbound: Option<UnboundedReceiver<BusMessage>>,
}

impl BusClient {
    /// Ouvre une connexion au broker et attend le CONNACK
    ///
    /// # Arguments
    ///
    /// * `host` - Hôte du broker MQTT
    /// * `port` - Port du broker (1883 par défaut dans la configuration)
    /// * `keep_alive` - Intervalle de keep-alive MQTT
    ///
    /// # Errors
    ///
    /// * [`BusError::BrokerUnreachable`] si la connexion transport échoue
    /// * [`BusError::ConnectionRefused`] si le broker refuse le CONNACK
    pub async fn connect(host: &str, port: u16, keep_alive: Duration) -> Result<Self> {
        let client_id = format!("pmojukebox-{}", Uuid::new_v4().simple());
        let mut options = MqttOptions::new(client_id, host, port);
        options.set_keep_alive(keep_alive);

        let (client, mut eventloop) = AsyncClient::new(options, 16);

        // Attendre le CONNACK avant de rendre la main : un échec de
        // connexion doit être visible de l'appelant, pas avalé par la
        // boucle de reconnexion de rumqttc.
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    if ack.code == ConnectReturnCode::Success {
                        debug!(host, port, "Connected to MQTT broker");
                        break;
                    }
                    return Err(BusError::ConnectionRefused(format!("{:?}", ack.code)));
                }
                Ok(_) => continue,
                Err(err) => return Err(BusError::BrokerUnreachable(err.to_string())),
            }
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let driver = tokio::spawn(drive(eventloop, tx));

        Ok(Self {
            client,
            driver: Some(driver),
            inbound: Some(rx),
        })
    }

    /// Publie un message en QoS 0 (au plus une fois)
    ///
    /// # Errors
    ///
    /// [`BusError::PublishFailed`] si la connexion n'est plus active
    pub async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        self.client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .await
            .map_err(|err| BusError::PublishFailed(err.to_string()))
    }

    /// S'abonne à un filtre de topics (wildcard accepté)
    pub async fn subscribe(&self, topic_filter: &str) -> Result<()> {
        self.client
            .subscribe(topic_filter, QoS::AtMostOnce)
            .await
            .map_err(|err| BusError::SubscribeFailed(err.to_string()))
    }

    /// Prend le flux des messages entrants
    ///
    /// Les messages sont livrés par la tâche de fond, de façon concurrente
    /// avec le fil qui a ouvert la connexion. Il n'y a qu'un seul
    /// consommateur : le deuxième appel retourne `None`.
    pub fn messages(&mut self) -> Option<UnboundedReceiver<BusMessage>> {
        self.inbound.take()
    }

    /// Ferme la connexion et libère la socket
    ///
    /// Idempotent. Le DISCONNECT part après les publications en attente,
    /// puis la tâche de fond est attendue : au retour, la socket est
    /// libérée et plus aucun message ne sera livré.
    pub async fn disconnect(&mut self) {
        if let Some(driver) = self.driver.take() {
            if self.client.disconnect().await.is_err() {
                // La boucle est déjà morte, rien à vidanger
                driver.abort();
            }
            let _ = driver.await;
            debug!("MQTT connection closed");
        }
    }
}

impl Drop for BusClient {
    fn drop(&mut self) {
        // Filet de sécurité si disconnect() n'a pas été appelé
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
    }
}

/// Pompe l'event loop rumqttc et relaie les publications entrantes
///
/// La boucle s'arrête sur DISCONNECT sortant, sur erreur de connexion, ou
/// quand le consommateur du canal a disparu. Pas de reconnexion : la
/// politique de reconnexion appartient au superviseur (stop/start).
async fn drive(mut eventloop: EventLoop, tx: UnboundedSender<BusMessage>) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let message = BusMessage {
                    topic: publish.topic.clone(),
                    payload: publish.payload.to_vec(),
                };
                if tx.send(message).is_err() {
                    debug!("Inbound consumer dropped, stopping MQTT loop");
                    break;
                }
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                debug!("MQTT disconnect requested");
                break;
            }
            Ok(_) => {}
            Err(err) => {
                warn!(error=%err, "MQTT connection lost");
                break;
            }
        }
    }
}
