//! The on-call provider seam.
//!
//! A provider supplies everything a report needs: the escalation policy,
//! the rendered schedule, the incidents and the user directory. The report
//! command materializes all of it before any aggregation starts.

use anyhow::Result;
use chrono::{DateTime, Utc};
use pager_hours_core::{Incident, ScheduleSegment, UserDetails};
use serde::{Deserialize, Serialize};

/// A service attached to an escalation policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
}

/// An escalation policy with the services it covers and the schedules it pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationPolicy {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub services: Vec<Service>,
    /// Schedule targets of the escalation rules, in rule order.
    #[serde(default)]
    pub schedule_ids: Vec<String>,
}

impl EscalationPolicy {
    /// The schedule whose shifts are reported on.
    pub fn primary_schedule(&self) -> Option<&str> {
        self.schedule_ids.first().map(String::as_str)
    }

    pub fn service_ids(&self) -> Vec<String> {
        self.services.iter().map(|s| s.id.clone()).collect()
    }
}

pub trait OnCallProvider {
    fn escalation_policies(&self) -> Result<Vec<EscalationPolicy>>;

    fn escalation_policy(&self, id: &str) -> Result<EscalationPolicy>;

    /// Final (rendered) shifts of a schedule overlapping `[since, until)`.
    fn schedule_entries(
        &self,
        schedule_id: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<ScheduleSegment>>;

    /// Incidents created in `[since, until)` on any of `service_ids`.
    fn incidents(
        &self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
        service_ids: &[String],
    ) -> Result<Vec<Incident>>;

    fn user(&self, id: &str) -> Result<UserDetails>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_schedule_is_the_first_target() {
        let policy = EscalationPolicy {
            id: "PPOL".to_string(),
            name: "Ops".to_string(),
            services: vec![
                Service {
                    id: "PS1".to_string(),
                    name: "API".to_string(),
                },
                Service {
                    id: "PS2".to_string(),
                    name: "DB".to_string(),
                },
            ],
            schedule_ids: vec!["PSCHED1".to_string(), "PSCHED2".to_string()],
        };
        assert_eq!(policy.primary_schedule(), Some("PSCHED1"));
        assert_eq!(policy.service_ids(), vec!["PS1", "PS2"]);
    }

    #[test]
    fn policy_without_schedule() {
        let policy: EscalationPolicy =
            serde_json::from_str(r#"{"id": "PPOL", "name": "Ops"}"#).unwrap();
        assert_eq!(policy.primary_schedule(), None);
        assert!(policy.services.is_empty());
    }
}
