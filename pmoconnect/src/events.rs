//! Taxonomie des événements du pont Spotify Connect

use std::fmt;

/// État du lecteur tel que rapporté par le démon de lecture
///
/// Le vocabulaire appartient au démon et peut grandir : les états inconnus
/// sont conservés tels quels dans [`PlayerState::Other`] au lieu d'être
/// rejetés.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerState {
    Started,
    Stopped,
    Playing,
    Paused,
    Other(String),
}

impl PlayerState {
    pub fn as_str(&self) -> &str {
        match self {
            PlayerState::Started => "started",
            PlayerState::Stopped => "stopped",
            PlayerState::Playing => "playing",
            PlayerState::Paused => "paused",
            PlayerState::Other(state) => state,
        }
    }
}

impl From<&str> for PlayerState {
    fn from(state: &str) -> Self {
        match state {
            "started" => PlayerState::Started,
            "stopped" => PlayerState::Stopped,
            "playing" => PlayerState::Playing,
            "paused" => PlayerState::Paused,
            other => PlayerState::Other(other.to_string()),
        }
    }
}

impl fmt::Display for PlayerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Événement typé produit par le classifieur du superviseur
///
/// Non persisté : consommé de façon synchrone par les observateurs
/// enregistrés.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectEvent {
    /// La piste en cours a changé
    Track { track_id: String },
    /// L'état du lecteur a changé
    Player { state: PlayerState },
}

/// Garde de dé-duplication pour les observateurs
///
/// Le résolveur de métadonnées est sans état : c'est à l'appelant de
/// comparer l'identifiant entrant au dernier traité et de sauter la
/// résolution quand ils sont égaux.
#[derive(Debug, Default)]
pub struct TrackDedup {
    last_track_id: Option<String>,
}

impl TrackDedup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vrai si `track_id` diffère du dernier identifiant vu
    ///
    /// Met à jour le dernier identifiant vu dans ce cas.
    pub fn is_new(&mut self, track_id: &str) -> bool {
        if self.last_track_id.as_deref() == Some(track_id) {
            return false;
        }
        self.last_track_id = Some(track_id.to_string());
        true
    }
}
