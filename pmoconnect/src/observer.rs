//! Enregistrement et notification des observateurs d'événements

use crate::events::ConnectEvent;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Observateur d'événements Spotify Connect
///
/// Les notifications arrivent sur la tâche de livraison du bus, de façon
/// concurrente avec le fil principal : les implémentations doivent assurer
/// leur propre synchronisation.
pub trait ConnectObserver: Send + Sync {
    fn on_event(&self, event: &ConnectEvent) -> anyhow::Result<()>;
}

/// Identifiant opaque retourné par l'abonnement, utilisé pour se désabonner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Registre d'observateurs avec contrat explicite subscribe/unsubscribe
///
/// La notification est synchrone et isole les échecs : l'erreur d'un
/// observateur est journalisée et n'empêche jamais les suivants d'être
/// notifiés.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: Mutex<Vec<(ObserverId, Arc<dyn ConnectObserver>)>>,
    next_id: AtomicU64,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enregistre un observateur et retourne son identifiant
    pub fn subscribe(&self, observer: Arc<dyn ConnectObserver>) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers.lock().unwrap().push((id, observer));
        id
    }

    /// Désenregistre un observateur
    ///
    /// Retourne `false` si l'identifiant n'était pas (ou plus) enregistré.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut observers = self.observers.lock().unwrap();
        let before = observers.len();
        observers.retain(|(oid, _)| *oid != id);
        observers.len() != before
    }

    /// Nombre d'observateurs enregistrés
    pub fn len(&self) -> usize {
        self.observers.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Notifie tous les observateurs, dans l'ordre d'enregistrement
    pub fn notify(&self, event: &ConnectEvent) {
        let observers = self.observers.lock().unwrap().clone();
        for (id, observer) in observers {
            if let Err(err) = observer.on_event(event) {
                warn!(observer=?id, error=%err, "Observer failed to handle event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::PlayerState;
    use anyhow::anyhow;

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

    struct Failing;

    impl ConnectObserver for Failing {
        fn on_event(&self, _event: &ConnectEvent) -> anyhow::Result<()> {
            Err(anyhow!("observer exploded"))
        }
    }

    #[test]
    fn every_registered_observer_receives_the_event() {
        let registry = ObserverRegistry::new();
        let first = Recorder::new();
        let second = Recorder::new();
        registry.subscribe(first.clone());
        registry.subscribe(second.clone());

        let event = ConnectEvent::Track {
            track_id: "3n3Ppam7vgaVa1iaRUc9Lp".to_string(),
        };
        registry.notify(&event);

        assert_eq!(first.seen.lock().unwrap().as_slice(), &[event.clone()]);
        assert_eq!(second.seen.lock().unwrap().as_slice(), &[event]);
    }

    #[test]
    fn a_failing_observer_does_not_block_the_others() {
        let registry = ObserverRegistry::new();
        registry.subscribe(Arc::new(Failing));
        let recorder = Recorder::new();
        registry.subscribe(recorder.clone());

        registry.notify(&ConnectEvent::Player {
            state: PlayerState::Started,
        });

        assert_eq!(recorder.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn unsubscribed_observers_are_no_longer_notified() {
        let registry = ObserverRegistry::new();
        let recorder = Recorder::new();
        let id = registry.subscribe(recorder.clone());

        assert!(registry.unsubscribe(id));
        assert!(!registry.unsubscribe(id));

        registry.notify(&ConnectEvent::Player {
            state: PlayerState::Stopped,
        });
        assert!(recorder.seen.lock().unwrap().is_empty());
        assert!(registry.is_empty());
    }
}
