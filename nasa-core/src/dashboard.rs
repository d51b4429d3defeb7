//! Cross-body mission overview. Mission data is curated; only the Mars
//! rover selection is live.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    client::NasaApi,
    rover::{ActiveRover, most_active_rover},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissionStatus {
    Active,
    Complete,
    Planned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub name: String,
    pub agency: String,
    pub launch_year: u16,
    pub status: MissionStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySummary {
    pub body: String,
    pub highlight: String,
    pub missions: Vec<Mission>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    pub bodies: Vec<BodySummary>,
    pub active_missions: usize,
    pub mars_most_active_rover: ActiveRover,
    pub timestamp: DateTime<Utc>,
}

fn mission(name: &str, agency: &str, launch_year: u16, status: MissionStatus) -> Mission {
    Mission {
        name: name.to_string(),
        agency: agency.to_string(),
        launch_year,
        status,
    }
}

fn body(body: &str, highlight: &str, missions: Vec<Mission>) -> BodySummary {
    BodySummary {
        body: body.to_string(),
        highlight: highlight.to_string(),
        missions,
    }
}

pub fn catalog() -> Vec<BodySummary> {
    use MissionStatus::*;

    vec![
        body(
            "Mars",
            "Sample caching in Jezero Crater",
            vec![
                mission("Perseverance", "NASA", 2020, Active),
                mission("Curiosity", "NASA", 2011, Active),
                mission("Mars Reconnaissance Orbiter", "NASA", 2005, Active),
                mission("InSight", "NASA", 2018, Complete),
                mission("Opportunity", "NASA", 2003, Complete),
            ],
        ),
        body(
            "Moon",
            "Crewed return under Artemis",
            vec![
                mission("Lunar Reconnaissance Orbiter", "NASA", 2009, Active),
                mission("Artemis I", "NASA", 2022, Complete),
                mission("Artemis II", "NASA", 2026, Planned),
            ],
        ),
        body(
            "Jupiter",
            "Icy moon habitability",
            vec![
                mission("Juno", "NASA", 2011, Active),
                mission("Europa Clipper", "NASA", 2024, Active),
            ],
        ),
        body(
            "Saturn",
            "Titan rotorcraft exploration",
            vec![
                mission("Cassini", "NASA/ESA/ASI", 1997, Complete),
                mission("Dragonfly", "NASA", 2028, Planned),
            ],
        ),
        body(
            "Deep Space",
            "Interstellar medium measurements",
            vec![
                mission("Voyager 1", "NASA", 1977, Active),
                mission("Voyager 2", "NASA", 1977, Active),
                mission("James Webb Space Telescope", "NASA/ESA/CSA", 2021, Active),
            ],
        ),
    ]
}

/// Never fails: the live rover lookup has its own fallback.
pub async fn dashboard(api: &dyn NasaApi) -> Dashboard {
    let bodies = catalog();
    let active_missions = bodies
        .iter()
        .flat_map(|b| &b.missions)
        .filter(|m| m.status == MissionStatus::Active)
        .count();

    Dashboard {
        bodies,
        active_missions,
        mars_most_active_rover: most_active_rover(api).await,
        timestamp: Utc::now(),
    }
}
