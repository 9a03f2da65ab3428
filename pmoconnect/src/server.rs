//! Superviseur de l'endpoint Spotify Connect
//!
//! [`ConnectServer`] possède les deux ressources longues du pont : le
//! processus librespot et l'abonnement au bus MQTT. `start()` acquiert les
//! deux ou aucune ; `stop()` libère les deux.

use crate::daemon::{LibrespotProcess, LibrespotSettings};
use crate::error::{ConnectError, Result};
use crate::events::{ConnectEvent, PlayerState};
use crate::observer::{ConnectObserver, ObserverId, ObserverRegistry};
use pmoconfig::Config;
use pmomqtt::{
    BusClient, BusMessage, MqttConfigExt, TOPIC_PLAYER_EVENT, TOPIC_TRACK_EVENT, TOPIC_WILDCARD,
};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Superviseur du démon de lecture et du pont d'événements
///
/// Machine à deux états : arrêté ou démarré. `start()` sur un serveur
/// démarré retourne [`ConnectError::AlreadyRunning`], `stop()` sur un
/// serveur arrêté retourne [`ConnectError::NotRunning`].
pub struct ConnectServer {
    config: Arc<Config>,
    observers: Arc<ObserverRegistry>,
    last_track_id: Arc<Mutex<Option<String>>>,
    process: Option<LibrespotProcess>,
    bus: Option<BusClient>,
    dispatch: Option<JoinHandle<()>>,
}

impl ConnectServer {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            observers: Arc::new(ObserverRegistry::new()),
            last_track_id: Arc::new(Mutex::new(None)),
            process: None,
            bus: None,
            dispatch: None,
        }
    }

    /// Vrai entre un `start()` réussi et le `stop()` correspondant
    pub fn is_running(&self) -> bool {
        self.process.is_some()
    }

    /// Dernier identifiant de piste vu sur le bus
    pub fn last_track_id(&self) -> Option<String> {
        self.last_track_id.lock().unwrap().clone()
    }

    /// Enregistre un observateur d'événements
    ///
    /// L'enregistrement survit aux cycles `stop()`/`start()`.
    pub fn subscribe_observer(&self, observer: Arc<dyn ConnectObserver>) -> ObserverId {
        self.observers.subscribe(observer)
    }

    /// Désenregistre un observateur
    pub fn unsubscribe_observer(&self, id: ObserverId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Lance librespot puis ouvre le canal d'événements
    ///
    /// Si la connexion au broker échoue, le processus qui vient d'être
    /// lancé est tué avant de retourner l'erreur : tourner sans canal
    /// d'événements signifierait perdre silencieusement chaque
    /// notification.
    pub async fn start(&mut self) -> Result<()> {
        if self.is_running() {
            return Err(ConnectError::AlreadyRunning);
        }

        let settings = LibrespotSettings::from_config(&self.config)?;
        let mut process = LibrespotProcess::spawn(settings)?;

        let host = self.config.get_mqtt_host();
        let port = self.config.get_mqtt_port();
        let keep_alive = self.config.get_mqtt_keep_alive();
        let mut bus = match BusClient::connect(&host, port, keep_alive).await {
            Ok(bus) => bus,
            Err(err) => {
                process.kill();
                return Err(ConnectError::BrokerConnectionRefused(err));
            }
        };

        bus.subscribe(TOPIC_WILDCARD).await?;
        let inbound = bus.messages();

        let observers = Arc::clone(&self.observers);
        let last_track_id = Arc::clone(&self.last_track_id);
        self.dispatch = inbound.map(|mut rx| {
            tokio::spawn(async move {
                while let Some(message) = rx.recv().await {
                    handle_message(&message, &observers, &last_track_id);
                }
                debug!("Event dispatch loop terminated");
            })
        });

        self.process = Some(process);
        self.bus = Some(bus);
        info!(host = %host, port, "Connect server started");
        Ok(())
    }

    /// Arrête librespot et ferme le canal d'événements
    pub async fn stop(&mut self) -> Result<()> {
        let Some(mut process) = self.process.take() else {
            return Err(ConnectError::NotRunning);
        };
        process.kill();

        if let Some(mut bus) = self.bus.take() {
            bus.disconnect().await;
        }
        if let Some(dispatch) = self.dispatch.take() {
            // La fermeture du bus termine la boucle de distribution
            let _ = dispatch.await;
        }

        info!("Connect server stopped");
        Ok(())
    }

    /// Cycle complet `stop()` puis `start()`
    ///
    /// Utilisable aussi bien pour appliquer une configuration modifiée que
    /// pour relancer un librespot mort.
    pub async fn restart(&mut self) -> Result<()> {
        if self.is_running() {
            self.stop().await?;
        }
        self.start().await
    }
}

/// Classifie un message du bus en événement typé
///
/// Retourne `None` pour les topics inconnus sous le wildcard et pour les
/// charges utiles non UTF-8.
pub fn classify(message: &BusMessage) -> Option<ConnectEvent> {
    let payload = match std::str::from_utf8(&message.payload) {
        Ok(payload) => payload.trim(),
        Err(_) => {
            warn!(topic = %message.topic, "Dropping non UTF-8 payload");
            return None;
        }
    };
    match message.topic.as_str() {
        TOPIC_TRACK_EVENT => Some(ConnectEvent::Track {
            track_id: payload.to_string(),
        }),
        TOPIC_PLAYER_EVENT => Some(ConnectEvent::Player {
            state: PlayerState::from(payload),
        }),
        other => {
            debug!(topic = %other, "Ignoring message on unhandled topic");
            None
        }
    }
}

fn handle_message(
    message: &BusMessage,
    observers: &ObserverRegistry,
    last_track_id: &Mutex<Option<String>>,
) {
    let Some(event) = classify(message) else {
        return;
    };
    if let ConnectEvent::Track { track_id } = &event {
        *last_track_id.lock().unwrap() = Some(track_id.clone());
    }
    observers.notify(&event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ConnectEvent;

    struct Recorder {
        seen: Mutex<Vec<ConnectEvent>>,
    }

    impl Recorder {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl ConnectObserver for Recorder {
        fn on_event(&self, event: &ConnectEvent) -> anyhow::Result<()> {
            self.seen.lock().unwrap().push(event.clone());
            Ok(())
        }
    }

    fn message(topic: &str, payload: &str) -> BusMessage {
        BusMessage {
            topic: topic.to_string(),
            payload: payload.as_bytes().to_vec(),
        }
    }

    #[test]
    fn track_messages_become_track_events() {
        let event = classify(&message(TOPIC_TRACK_EVENT, "3n3Ppam7vgaVa1iaRUc9Lp"));
        assert_eq!(
            event,
            Some(ConnectEvent::Track {
                track_id: "3n3Ppam7vgaVa1iaRUc9Lp".to_string()
            })
        );
    }

    #[test]
    fn player_messages_become_player_events() {
        let event = classify(&message(TOPIC_PLAYER_EVENT, "playing"));
        assert_eq!(
            event,
            Some(ConnectEvent::Player {
                state: PlayerState::Playing
            })
        );
    }

    #[test]
    fn payload_whitespace_is_trimmed() {
        let event = classify(&message(TOPIC_PLAYER_EVENT, "stopped\n"));
        assert_eq!(
            event,
            Some(ConnectEvent::Player {
                state: PlayerState::Stopped
            })
        );
    }

    #[test]
    fn unknown_topics_under_the_wildcard_are_dropped() {
        assert_eq!(classify(&message("spotify/volume", "42")), None);
    }

    #[test]
    fn non_utf8_payloads_are_dropped() {
        let msg = BusMessage {
            topic: TOPIC_TRACK_EVENT.to_string(),
            payload: vec![0xff, 0xfe],
        };
        assert_eq!(classify(&msg), None);
    }

    #[test]
    fn handled_track_events_update_the_last_track_id() {
        let observers = ObserverRegistry::new();
        let recorder = Recorder::new();
        observers.subscribe(recorder.clone());
        let last = Mutex::new(None);

        handle_message(
            &message(TOPIC_TRACK_EVENT, "3n3Ppam7vgaVa1iaRUc9Lp"),
            &observers,
            &last,
        );

        assert_eq!(
            last.lock().unwrap().as_deref(),
            Some("3n3Ppam7vgaVa1iaRUc9Lp")
        );
        assert_eq!(recorder.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn dropped_messages_do_not_reach_observers() {
        let observers = ObserverRegistry::new();
        let recorder = Recorder::new();
        observers.subscribe(recorder.clone());
        let last = Mutex::new(None);

        handle_message(&message("spotify/volume", "42"), &observers, &last);

        assert!(last.lock().unwrap().is_none());
        assert!(recorder.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn player_events_are_delivered_in_arrival_order() {
        let observers = ObserverRegistry::new();
        let recorder = Recorder::new();
        observers.subscribe(recorder.clone());
        let last = Mutex::new(None);

        handle_message(&message(TOPIC_PLAYER_EVENT, "started"), &observers, &last);
        handle_message(&message(TOPIC_PLAYER_EVENT, "stopped"), &observers, &last);

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(
            seen.as_slice(),
            &[
                ConnectEvent::Player {
                    state: PlayerState::Started
                },
                ConnectEvent::Player {
                    state: PlayerState::Stopped
                },
            ]
        );
    }

    #[test]
    fn a_deduplicating_observer_sees_repeated_ids_once() {
        use crate::events::TrackDedup;

        struct Counting {
            dedup: Mutex<TrackDedup>,
            resolved: Mutex<u32>,
        }

        impl ConnectObserver for Counting {
            fn on_event(&self, event: &ConnectEvent) -> anyhow::Result<()> {
                if let ConnectEvent::Track { track_id } = event {
                    if self.dedup.lock().unwrap().is_new(track_id) {
                        *self.resolved.lock().unwrap() += 1;
                    }
                }
                Ok(())
            }
        }

        let observers = ObserverRegistry::new();
        let counting = Arc::new(Counting {
            dedup: Mutex::new(TrackDedup::new()),
            resolved: Mutex::new(0),
        });
        observers.subscribe(counting.clone());
        let last = Mutex::new(None);

        for _ in 0..2 {
            handle_message(
                &message(TOPIC_TRACK_EVENT, "3n3Ppam7vgaVa1iaRUc9Lp"),
                &observers,
                &last,
            );
        }

        assert_eq!(*counting.resolved.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn failed_broker_connection_rolls_back_the_spawned_daemon() -> anyhow::Result<()> {
        use serde_yaml::Value;
        use std::os::unix::fs::PermissionsExt;
        use std::time::Duration;

        let dir = tempfile::tempdir()?;
        let config = Config::load_config(dir.path().to_str().unwrap())?;

        // Faux démon : il note son pid puis dort, pour que le test puisse
        // vérifier qu'il a bien été tué par le rollback
        let pid_file = dir.path().join("daemon.pid");
        let script = dir.path().join("fake_daemon.sh");
        std::fs::write(
            &script,
            format!("#!/bin/sh\necho $$ > '{}'\nexec sleep 30\n", pid_file.display()),
        )?;
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))?;
        config.set_value(
            &["spotify", "binary"],
            Value::String(script.to_string_lossy().into_owned()),
        )?;

        // Un listener muet : la connexion TCP aboutit mais aucun CONNACK
        // n'arrive, la phase de connexion échoue sur son timeout
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        config.set_mqtt_host("127.0.0.1")?;
        config.set_mqtt_port(port)?;

        let mut server = ConnectServer::new(Arc::new(config));
        let err = tokio::time::timeout(Duration::from_secs(30), server.start())
            .await?
            .expect_err("start should fail without a broker");

        assert!(matches!(err, ConnectError::BrokerConnectionRefused(_)));
        assert!(!server.is_running());

        // Le processus lancé avant l'échec de connexion ne survit pas
        let pid = std::fs::read_to_string(&pid_file)?.trim().parse::<u32>()?;
        assert!(
            !std::path::Path::new(&format!("/proc/{pid}")).exists(),
            "daemon survived the rollback"
        );
        drop(listener);
        Ok(())
    }

    #[tokio::test]
    async fn stop_before_start_is_not_running() {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(Config::load_config(dir.path().to_str().unwrap()).unwrap());
        let mut server = ConnectServer::new(config);
        assert!(!server.is_running());
        assert!(matches!(
            server.stop().await,
            Err(ConnectError::NotRunning)
        ));
    }
}
