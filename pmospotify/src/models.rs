//! Structures de données pour représenter les métadonnées Spotify

use serde::{Deserialize, Serialize};

/// Référence d'artiste telle qu'attachée à une piste
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtistRef {
    /// Identifiant unique de l'artiste
    pub id: String,
    /// Nom de l'artiste
    pub name: String,
}

/// Image de pochette ou d'artiste
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Image {
    /// URL de l'image
    pub url: String,
    /// Largeur en pixels (absente pour certaines sources)
    #[serde(default)]
    pub width: Option<u32>,
    /// Hauteur en pixels
    #[serde(default)]
    pub height: Option<u32>,
}

/// Métadonnées complètes d'une piste
///
/// Valeur immuable produite par une résolution ; le résolveur ne la met
/// pas en cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackMetadata {
    /// Identifiant Spotify de la piste
    pub id: String,
    /// Titre de la piste
    pub title: String,
    /// Artistes, dans l'ordre retourné par le catalogue
    pub artists: Vec<ArtistRef>,
    /// Nom de l'album
    pub album: String,
    /// Pochettes de l'album, de la plus grande à la plus petite
    pub images: Vec<Image>,
}

impl TrackMetadata {
    /// Noms des artistes joints par des virgules, pour l'affichage
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Identifiants des artistes, dans l'ordre du catalogue
    pub fn artist_ids(&self) -> Vec<String> {
        self.artists.iter().map(|a| a.id.clone()).collect()
    }
}

/// Métadonnées complètes d'un artiste
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtistMetadata {
    /// Identifiant Spotify de l'artiste
    pub id: String,
    /// Nom de l'artiste
    pub name: String,
    /// Portraits de l'artiste
    pub images: Vec<Image>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artist_names_preserves_catalog_order() {
        let track = TrackMetadata {
            id: "t1".into(),
            title: "Mr. Brightside".into(),
            artists: vec![
                ArtistRef {
                    id: "a1".into(),
                    name: "The Killers".into(),
                },
                ArtistRef {
                    id: "a2".into(),
                    name: "Someone Else".into(),
                },
            ],
            album: "Hot Fuss".into(),
            images: vec![],
        };

        assert_eq!(track.artist_names(), "The Killers, Someone Else");
        assert_eq!(track.artist_ids(), vec!["a1", "a2"]);
    }
}
