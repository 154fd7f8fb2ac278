use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// Data structures decoded from the Flux daemon API (PascalCase wire names).

/// Opaque workload identifier in the `namespace:kind/name` form the daemon
/// hands out. Never parsed apart by this app.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkloadId(String);

impl WorkloadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One deployable image version (image:tag) from the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerDescription {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A container of a workload: what is deployed now, and which versions the
/// catalog offers. `available` is `None` until the image catalog has been
/// fetched for the workload.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FluxContainer {
    pub name: String,
    pub current: ContainerDescription,
    #[serde(default)]
    pub available: Option<Vec<ContainerDescription>>,
}

impl FluxContainer {
    /// Versions offered for deployment, in catalog order. Empty when the
    /// catalog has not been loaded or offers nothing.
    pub fn available_versions(&self) -> &[ContainerDescription] {
        self.available.as_deref().unwrap_or(&[])
    }

    pub fn is_current(&self, description: &ContainerDescription) -> bool {
        description.id == self.current.id
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FluxWorkload {
    #[serde(rename = "ID")]
    pub id: WorkloadId,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub automated: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub containers: Vec<FluxContainer>,
}

/// Image catalog entry for one workload, as returned by the images endpoint.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FluxImage {
    #[serde(rename = "ID")]
    pub id: WorkloadId,
    #[serde(default)]
    pub containers: Vec<FluxContainer>,
}

pub fn format_created(created_at: Option<&DateTime<Utc>>) -> String {
    let Some(created) = created_at else {
        return "Unknown".to_string();
    };

    let now = Utc::now();
    let duration = now.signed_duration_since(*created);

    if duration.num_days() > 0 {
        format!("{}d ago", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m ago", duration.num_minutes())
    } else {
        format!("{}s ago", duration.num_seconds())
    }
}
