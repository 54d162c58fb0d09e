//! Offline provider replaying a JSON capture of provider data.
//!
//! ```json
//! {
//!   "policies": [{"id": "PPOL", "name": "Ops", "services": [], "schedule_ids": ["PSCHED"]}],
//!   "schedules": {"PSCHED": [{"user_id": "P1", "user_email": "a@example.com",
//!                             "start": "2024-03-04T00:00:00Z", "end": "2024-03-05T00:00:00Z"}]},
//!   "users": [{"id": "P1", "email": "a@example.com", "name": "A", "time_zone": "Berlin"}],
//!   "incidents": [{"created_at": "2024-03-04T03:10:00Z", "escalation_policy_id": "PPOL"}]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use pager_hours_core::{Incident, ScheduleSegment, UserDetails};
use serde::Deserialize;

use crate::provider::{EscalationPolicy, OnCallProvider};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    policies: Vec<EscalationPolicy>,
    #[serde(default)]
    schedules: BTreeMap<String, Vec<ScheduleSegment>>,
    #[serde(default)]
    users: Vec<UserDetails>,
    #[serde(default)]
    incidents: Vec<SnapshotIncident>,
}

#[derive(Debug, Clone, Deserialize)]
struct SnapshotIncident {
    #[serde(flatten)]
    incident: Incident,
    /// Service the incident was raised on; unset matches every service.
    #[serde(default)]
    service_id: Option<String>,
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("Invalid snapshot: {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

impl OnCallProvider for Snapshot {
    fn escalation_policies(&self) -> Result<Vec<EscalationPolicy>> {
        Ok(self.policies.clone())
    }

    fn escalation_policy(&self, id: &str) -> Result<EscalationPolicy> {
        self.policies
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| anyhow!("escalation policy {} not found in snapshot", id))
    }

    fn schedule_entries(
        &self,
        schedule_id: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<ScheduleSegment>> {
        let entries = self
            .schedules
            .get(schedule_id)
            .ok_or_else(|| anyhow!("schedule {} not found in snapshot", schedule_id))?;

        let mut clipped: Vec<ScheduleSegment> = entries
            .iter()
            .filter(|s| s.start < until && s.end > since)
            .map(|s| ScheduleSegment {
                start: s.start.max(since),
                end: s.end.min(until),
                ..s.clone()
            })
            .collect();
        clipped.sort_by_key(|s| s.start);
        Ok(clipped)
    }

    fn incidents(
        &self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
        service_ids: &[String],
    ) -> Result<Vec<Incident>> {
        Ok(self
            .incidents
            .iter()
            .filter(|i| i.incident.created_at >= since && i.incident.created_at < until)
            .filter(|i| match &i.service_id {
                Some(service) => service_ids.is_empty() || service_ids.contains(service),
                None => true,
            })
            .map(|i| i.incident.clone())
            .collect())
    }

    fn user(&self, id: &str) -> Result<UserDetails> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| anyhow!("user {} not found in snapshot", id))
    }
}
