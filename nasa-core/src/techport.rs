//! NASA TechPort technology projects.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::{
    client::{NasaApi, decode},
    error::UpstreamError,
    serde_util::lenient_u32,
};

pub const PROJECTS_PATH: &str = "techport/api/projects";

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 50;

/// NASA Technology Taxonomy areas.
pub const TAXONOMY: [(&str, &str); 17] = [
    ("TX01", "Propulsion Systems"),
    ("TX02", "Flight Computing and Avionics"),
    ("TX03", "Aerospace Power and Energy Storage"),
    ("TX04", "Robotic Systems"),
    ("TX05", "Communications, Navigation, and Orbital Debris Tracking and Characterization Systems"),
    ("TX06", "Human Health, Life Support, and Habitation Systems"),
    ("TX07", "Exploration Destination Systems"),
    ("TX08", "Sensors and Instruments"),
    ("TX09", "Entry, Descent, and Landing"),
    ("TX10", "Autonomous Systems"),
    ("TX11", "Software, Modeling, Simulation, and Information Processing"),
    ("TX12", "Materials, Structures, Mechanical Systems, and Manufacturing"),
    ("TX13", "Ground, Test, and Surface Systems"),
    ("TX14", "Thermal Management Systems"),
    ("TX15", "Flight Vehicle Systems"),
    ("TX16", "Air Traffic Management and Range Tracking Systems"),
    ("TX17", "Guidance, Navigation, and Control"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub code: String,
    pub title: String,
}

pub fn categories() -> Vec<Category> {
    TAXONOMY
        .iter()
        .map(|(code, title)| Category {
            code: code.to_string(),
            title: title.to_string(),
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct ProjectRef {
    #[serde(rename = "projectId")]
    project_id: u64,
}

#[derive(Debug, Deserialize)]
struct ProjectPage {
    projects: Vec<ProjectRef>,
}

/// The listing has been served both flat and wrapped in a page object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProjectListing {
    Flat { projects: Vec<ProjectRef> },
    Nested { projects: ProjectPage },
}

impl ProjectListing {
    fn into_ids(self) -> Vec<u64> {
        let refs = match self {
            ProjectListing::Flat { projects } => projects,
            ProjectListing::Nested { projects } => projects.projects,
        };
        refs.into_iter().map(|r| r.project_id).collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TaxonomyNode {
    title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Organization {
    organization_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawProject {
    project_id: u64,
    title: String,
    description: Option<String>,
    status: Option<String>,
    start_date_string: Option<String>,
    end_date_string: Option<String>,
    #[serde(deserialize_with = "lenient_u32")]
    current_trl: Option<u32>,
    primary_taxonomy_nodes: Vec<TaxonomyNode>,
    lead_organization: Option<Organization>,
    website: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProjectEnvelope {
    project: RawProject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub trl: Option<u8>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub lead_organization: Option<String>,
    pub website: Option<String>,
}

impl From<RawProject> for ProjectSummary {
    fn from(raw: RawProject) -> Self {
        Self {
            id: raw.project_id,
            title: raw.title,
            description: raw.description,
            status: raw.status,
            category: raw.primary_taxonomy_nodes.into_iter().next().map(|n| n.title),
            trl: raw.current_trl.and_then(|t| u8::try_from(t).ok()),
            start_date: raw.start_date_string,
            end_date: raw.end_date_string,
            lead_organization: raw
                .lead_organization
                .map(|o| o.organization_name)
                .filter(|n| !n.is_empty()),
            website: raw.website.filter(|w| !w.is_empty()),
        }
    }
}

/// Client-side filters applied after project details are fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFilter {
    pub category: Option<String>,
    pub status: Option<String>,
    pub trl: Option<u8>,
    pub limit: usize,
}

impl Default for ProjectFilter {
    fn default() -> Self {
        Self {
            category: None,
            status: None,
            trl: None,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ProjectFilter {
    pub fn matches(&self, project: &ProjectSummary) -> bool {
        let category_ok = self.category.as_deref().is_none_or(|wanted| {
            project
                .category
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&wanted.to_lowercase()))
        });
        let status_ok = self.status.as_deref().is_none_or(|wanted| {
            project
                .status
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(wanted))
        });
        let trl_ok = self.trl.is_none_or(|wanted| project.trl == Some(wanted));

        category_ok && status_ok && trl_ok
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectList {
    pub projects: Vec<ProjectSummary>,
    pub total: usize,
    pub filters: ProjectFilter,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectAnalytics {
    pub sample_size: usize,
    pub by_status: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
    pub by_trl: BTreeMap<u8, usize>,
    pub average_trl: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

pub async fn project_detail(api: &dyn NasaApi, id: u64) -> Result<ProjectSummary, UpstreamError> {
    let path = format!("{PROJECTS_PATH}/{id}");
    let value = api.get_json(&path, &[]).await?;
    let envelope: ProjectEnvelope = decode(&path, value)?;
    Ok(envelope.project.into())
}

/// Fetches up to `limit` project details. The listing call must succeed;
/// individual detail failures are dropped.
async fn sample_projects(api: &dyn NasaApi, limit: usize) -> Result<Vec<ProjectSummary>, UpstreamError> {
    let value = api.get_json(PROJECTS_PATH, &[]).await?;
    let listing: ProjectListing = decode(PROJECTS_PATH, value)?;
    let ids: Vec<u64> = listing.into_ids().into_iter().take(limit.clamp(1, MAX_LIMIT)).collect();

    let details = join_all(ids.iter().map(|&id| project_detail(api, id))).await;

    Ok(ids
        .into_iter()
        .zip(details)
        .filter_map(|(id, result)| match result {
            Ok(project) => Some(project),
            Err(e) => {
                warn!(project_id = id, error = %e, "skipping TechPort project");
                None
            }
        })
        .collect())
}

pub async fn list_projects(api: &dyn NasaApi, filter: ProjectFilter) -> Result<ProjectList, UpstreamError> {
    let projects: Vec<ProjectSummary> = sample_projects(api, filter.limit)
        .await?
        .into_iter()
        .filter(|p| filter.matches(p))
        .collect();

    Ok(ProjectList {
        total: projects.len(),
        projects,
        filters: filter,
        timestamp: Utc::now(),
    })
}

pub async fn analytics(api: &dyn NasaApi, limit: usize) -> Result<ProjectAnalytics, UpstreamError> {
    let projects = sample_projects(api, limit).await?;
    Ok(summarize(&projects))
}

fn summarize(projects: &[ProjectSummary]) -> ProjectAnalytics {
    let mut by_status = BTreeMap::new();
    let mut by_category = BTreeMap::new();
    let mut by_trl = BTreeMap::new();

    for p in projects {
        let status = p.status.clone().unwrap_or_else(|| "Unknown".to_string());
        *by_status.entry(status).or_insert(0) += 1;

        let category = p.category.clone().unwrap_or_else(|| "Uncategorized".to_string());
        *by_category.entry(category).or_insert(0) += 1;

        if let Some(trl) = p.trl {
            *by_trl.entry(trl).or_insert(0) += 1;
        }
    }

    let rated: Vec<f64> = projects.iter().filter_map(|p| p.trl.map(f64::from)).collect();
    let average_trl = (!rated.is_empty())
        .then(|| (rated.iter().sum::<f64>() / rated.len() as f64 * 10.0).round() / 10.0);

    ProjectAnalytics {
        sample_size: projects.len(),
        by_status,
        by_category,
        by_trl,
        average_trl,
        timestamp: Utc::now(),
    }
}
