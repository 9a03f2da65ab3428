//! Module d'accès au catalogue Spotify (tracks, artistes)

use super::SpotifyApi;
use crate::error::Result;
use crate::models::{ArtistMetadata, ArtistRef, Image, TrackMetadata};
use serde::Deserialize;

/// Réponse de l'endpoint /tracks/{id}
#[derive(Debug, Deserialize)]
pub(crate) struct TrackResponse {
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<ArtistRefResponse>,
    album: AlbumResponse,
}

/// Référence artiste attachée à une piste ou un album
#[derive(Debug, Deserialize)]
struct ArtistRefResponse {
    id: String,
    name: String,
}

/// Album imbriqué dans une réponse piste
#[derive(Debug, Deserialize)]
struct AlbumResponse {
    name: String,
    #[serde(default)]
    images: Vec<ImageResponse>,
}

/// Réponse image
#[derive(Debug, Deserialize)]
struct ImageResponse {
    url: String,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

/// Réponse de l'endpoint /artists/{id}
#[derive(Debug, Deserialize)]
pub(crate) struct ArtistResponse {
    id: String,
    name: String,
    #[serde(default)]
    images: Vec<ImageResponse>,
}

impl From<ImageResponse> for Image {
    fn from(image: ImageResponse) -> Self {
        Image {
            url: image.url,
            width: image.width,
            height: image.height,
        }
    }
}

impl From<TrackResponse> for TrackMetadata {
    fn from(track: TrackResponse) -> Self {
        TrackMetadata {
            id: track.id,
            title: track.name,
            artists: track
                .artists
                .into_iter()
                .map(|a| ArtistRef {
                    id: a.id,
                    name: a.name,
                })
                .collect(),
            album: track.album.name,
            images: track.album.images.into_iter().map(Image::from).collect(),
        }
    }
}

impl From<ArtistResponse> for ArtistMetadata {
    fn from(artist: ArtistResponse) -> Self {
        ArtistMetadata {
            id: artist.id,
            name: artist.name,
            images: artist.images.into_iter().map(Image::from).collect(),
        }
    }
}

impl SpotifyApi {
    /// Récupère les détails d'une piste
    pub(crate) async fn get_track(&self, token: &str, track_id: &str) -> Result<TrackResponse> {
        self.get(&format!("/tracks/{track_id}"), token).await
    }

    /// Récupère les détails d'un artiste
    pub(crate) async fn get_artist(&self, token: &str, artist_id: &str) -> Result<ArtistResponse> {
        self.get(&format!("/artists/{artist_id}"), token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_response_converts_to_metadata() {
        let json = r#"{
            "id": "3n3Ppam7vgaVa1iaRUc9Lp",
            "name": "Mr. Brightside",
            "artists": [{"id": "0C0XlULifJtAgn6ZNCW2eu", "name": "The Killers"}],
            "album": {
                "name": "Hot Fuss",
                "images": [{"url": "https://i.scdn.co/image/abc", "width": 640, "height": 640}]
            }
        }"#;

        let response: TrackResponse = serde_json::from_str(json).unwrap();
        let track = TrackMetadata::from(response);

        assert_eq!(track.id, "3n3Ppam7vgaVa1iaRUc9Lp");
        assert_eq!(track.title, "Mr. Brightside");
        assert_eq!(track.album, "Hot Fuss");
        assert_eq!(track.artists.len(), 1);
        assert_eq!(track.artists[0].name, "The Killers");
        assert_eq!(track.images[0].width, Some(640));
    }

    #[test]
    fn missing_images_default_to_empty() {
        let json = r#"{
            "id": "t",
            "name": "n",
            "artists": [],
            "album": {"name": "a"}
        }"#;
        let response: TrackResponse = serde_json::from_str(json).unwrap();
        let track = TrackMetadata::from(response);
        assert!(track.images.is_empty());
    }
}
