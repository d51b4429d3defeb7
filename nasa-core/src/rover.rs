//! Mars rover photos and manifests.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use tracing::{info, warn};

use crate::{
    client::{NasaApi, decode},
    error::{UpstreamError, ValidationError},
};

/// Sol used when a photo request does not name one.
pub const DEFAULT_SOL: u32 = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rover {
    #[default]
    Curiosity,
    Perseverance,
    Opportunity,
    Spirit,
}

impl Rover {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rover::Curiosity => "curiosity",
            Rover::Perseverance => "perseverance",
            Rover::Opportunity => "opportunity",
            Rover::Spirit => "spirit",
        }
    }

    pub const fn all() -> &'static [Rover] {
        &[Rover::Curiosity, Rover::Perseverance, Rover::Opportunity, Rover::Spirit]
    }

    /// Fallback when no rover reports itself active.
    pub const fn default_active() -> Rover {
        Rover::Perseverance
    }
}

impl fmt::Display for Rover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Rover {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.trim().to_lowercase();

        Rover::all()
            .iter()
            .copied()
            .find(|r| r.as_str() == lower)
            .ok_or_else(|| {
                ValidationError::new(
                    "rover",
                    format!(
                        "unknown rover '{value}'. Supported rovers: curiosity, perseverance, opportunity, spirit"
                    ),
                )
            })
    }
}

impl FromStr for Rover {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rover::try_from(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Camera {
    pub id: u64,
    pub name: String,
    pub rover_id: u64,
    pub full_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoRover {
    pub id: u64,
    pub name: String,
    pub landing_date: String,
    pub launch_date: String,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Photo {
    pub id: u64,
    pub sol: u32,
    pub camera: Camera,
    pub img_src: String,
    pub earth_date: String,
    pub rover: PhotoRover,
}

#[derive(Debug, Deserialize)]
struct PhotosEnvelope {
    photos: Vec<Photo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotosResponse {
    pub photos: Vec<Photo>,
    pub total_photos: usize,
    pub rover: Rover,
    pub sol: u32,
}

impl PhotosResponse {
    pub fn empty(rover: Rover, sol: u32) -> Self {
        Self::new(Vec::new(), rover, sol)
    }

    fn new(photos: Vec<Photo>, rover: Rover, sol: u32) -> Self {
        Self {
            total_photos: photos.len(),
            photos,
            rover,
            sol,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestSol {
    pub sol: u32,
    pub earth_date: String,
    pub total_photos: u64,
    pub cameras: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoManifest {
    pub name: String,
    pub landing_date: String,
    pub launch_date: String,
    pub status: String,
    pub max_sol: u32,
    pub max_date: String,
    pub total_photos: u64,
    pub photos: Vec<ManifestSol>,
}

impl PhotoManifest {
    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("active")
    }
}

#[derive(Debug, Deserialize)]
struct ManifestEnvelope {
    photo_manifest: PhotoManifest,
}

fn photos_path(rover: Rover) -> String {
    format!("mars-photos/api/v1/rovers/{rover}/photos")
}

pub fn manifest_path(rover: Rover) -> String {
    format!("mars-photos/api/v1/manifests/{rover}")
}

/// Photos for one sol. Upstream failures and malformed payloads yield an
/// empty list instead of an error.
pub async fn fetch_photos(api: &dyn NasaApi, rover: Rover, sol: u32) -> PhotosResponse {
    let path = photos_path(rover);
    let value = match api.get_json(&path, &[("sol", sol.to_string())]).await {
        Ok(value) => value,
        Err(e) => {
            warn!(%rover, sol, error = %e, "rover photos unavailable, returning empty set");
            return PhotosResponse::empty(rover, sol);
        }
    };

    match serde_json::from_value::<PhotosEnvelope>(value) {
        Ok(envelope) => PhotosResponse::new(envelope.photos, rover, sol),
        Err(e) => {
            warn!(%rover, sol, error = %e, "rover photos payload malformed, returning empty set");
            PhotosResponse::empty(rover, sol)
        }
    }
}

pub async fn fetch_manifest(api: &dyn NasaApi, rover: Rover) -> Result<PhotoManifest, UpstreamError> {
    let path = manifest_path(rover);
    let value = api.get_json(&path, &[]).await?;
    let envelope: ManifestEnvelope = decode(&path, value)?;
    Ok(envelope.photo_manifest)
}

/// The rover chosen as most active, with where its photo record ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveRover {
    pub rover: Rover,
    pub max_sol: Option<u32>,
    pub max_date: Option<String>,
}

/// Among active rovers, the one with the latest `max_date`.
pub fn select_most_active<'a>(
    manifests: impl IntoIterator<Item = (Rover, &'a PhotoManifest)>,
) -> Option<(Rover, &'a PhotoManifest)> {
    let mut best: Option<(Rover, &'a PhotoManifest)> = None;
    for (rover, manifest) in manifests {
        if !manifest.is_active() {
            continue;
        }
        // Dates are ISO strings, so lexicographic order is chronological.
        if best.is_none_or(|(_, b)| manifest.max_date > b.max_date) {
            best = Some((rover, manifest));
        }
    }
    best
}

/// Queries every rover's manifest concurrently, tolerating individual failures.
/// Never fails; falls back to [`Rover::default_active`].
pub async fn most_active_rover(api: &dyn NasaApi) -> ActiveRover {
    let results = join_all(Rover::all().iter().map(|&rover| async move {
        (rover, fetch_manifest(api, rover).await)
    }))
    .await;

    let manifests: Vec<(Rover, PhotoManifest)> = results
        .into_iter()
        .filter_map(|(rover, result)| match result {
            Ok(manifest) => Some((rover, manifest)),
            Err(e) => {
                warn!(%rover, error = %e, "manifest unavailable");
                None
            }
        })
        .collect();

    match select_most_active(manifests.iter().map(|(r, m)| (*r, m))) {
        Some((rover, manifest)) => {
            info!(%rover, max_date = %manifest.max_date, "most active rover selected");
            ActiveRover {
                rover,
                max_sol: Some(manifest.max_sol),
                max_date: Some(manifest.max_date.clone()),
            }
        }
        None => {
            let rover = Rover::default_active();
            warn!(%rover, "no active rover manifests, using default");
            ActiveRover {
                rover,
                max_sol: None,
                max_date: None,
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::fake::StubApi;
    use serde_json::{Value, json};

    pub(crate) fn manifest(name: &str, status: &str, max_sol: u32, max_date: &str) -> Value {
        json!({"photo_manifest": {
            "name": name, "status": status, "max_sol": max_sol, "max_date": max_date,
            "landing_date": "2012-08-06", "launch_date": "2011-11-26", "total_photos": 100,
            "photos": [{"sol": 0, "earth_date": "2012-08-06", "total_photos": 3, "cameras": ["FHAZ"]}]
        }})
    }

    #[test]
    fn rover_names_roundtrip() {
        for rover in Rover::all() {
            assert_eq!(Rover::try_from(rover.as_str()).unwrap(), *rover);
        }
        assert_eq!("Curiosity".parse::<Rover>().unwrap(), Rover::Curiosity);
    }

    #[test]
    fn unknown_rover_is_validation_error() {
        let err = Rover::try_from("not-a-rover").unwrap_err();
        assert_eq!(err.field, "rover");
        assert!(err.message.contains("Supported rovers"));
    }

    #[tokio::test]
    async fn photos_are_counted() {
        let api = StubApi::default().with_json(
            &photos_path(Rover::Curiosity),
            json!({"photos": [
                {"id": 1, "sol": 1000, "img_src": "http://x/1.jpg", "earth_date": "2015-05-30",
                 "camera": {"id": 20, "name": "FHAZ", "rover_id": 5, "full_name": "Front Hazard Avoidance Camera"},
                 "rover": {"id": 5, "name": "Curiosity", "status": "active"}},
                {"id": 2, "sol": 1000, "img_src": "http://x/2.jpg"}
            ]}),
        );

        let res = fetch_photos(&api, Rover::Curiosity, 1000).await;
        assert_eq!(res.total_photos, 2);
        assert_eq!(res.photos[0].camera.name, "FHAZ");
        assert_eq!(res.rover, Rover::Curiosity);
        assert_eq!(res.sol, 1000);
    }

    #[tokio::test]
    async fn photo_failures_become_empty() {
        let res = fetch_photos(&StubApi::failing(), Rover::Spirit, 5).await;
        assert_eq!(res, PhotosResponse::empty(Rover::Spirit, 5));

        let api = StubApi::default().with_json(&photos_path(Rover::Spirit), json!({"latest": []}));
        let res = fetch_photos(&api, Rover::Spirit, 5).await;
        assert!(res.photos.is_empty());
        assert_eq!(res.total_photos, 0);
    }

    #[tokio::test]
    async fn manifest_decodes_and_propagates_errors() {
        let api = StubApi::default().with_json(
            &manifest_path(Rover::Curiosity),
            manifest("Curiosity", "active", 4100, "2024-02-19"),
        );
        let m = fetch_manifest(&api, Rover::Curiosity).await.unwrap();
        assert_eq!(m.max_sol, 4100);
        assert!(m.is_active());
        assert_eq!(m.photos[0].cameras, vec!["FHAZ"]);

        let err = fetch_manifest(&api, Rover::Spirit).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Transport { .. }));
    }

    #[test]
    fn selection_prefers_latest_active() {
        let a: PhotoManifest = serde_json::from_value(manifest("Curiosity", "active", 4100, "2024-02-19")["photo_manifest"].clone()).unwrap();
        let b: PhotoManifest = serde_json::from_value(manifest("Perseverance", "active", 1100, "2024-03-01")["photo_manifest"].clone()).unwrap();
        let c: PhotoManifest = serde_json::from_value(manifest("Opportunity", "complete", 5111, "2019-06-11")["photo_manifest"].clone()).unwrap();

        let picked = select_most_active([(Rover::Curiosity, &a), (Rover::Perseverance, &b), (Rover::Opportunity, &c)]);
        assert_eq!(picked.map(|(r, _)| r), Some(Rover::Perseverance));

        assert!(select_most_active([(Rover::Opportunity, &c)]).is_none());
    }

    #[tokio::test]
    async fn most_active_tolerates_partial_failure() {
        let api = StubApi::default()
            .with_json(&manifest_path(Rover::Curiosity), manifest("Curiosity", "active", 4100, "2024-02-19"))
            .with_json(&manifest_path(Rover::Spirit), manifest("Spirit", "complete", 2208, "2010-03-21"));

        let active = most_active_rover(&api).await;
        assert_eq!(active.rover, Rover::Curiosity);
        assert_eq!(active.max_sol, Some(4100));
    }

    #[tokio::test]
    async fn most_active_defaults_when_nothing_qualifies() {
        let active = most_active_rover(&StubApi::failing()).await;
        assert_eq!(active.rover, Rover::default_active());
        assert_eq!(active.max_sol, None);
    }
}
