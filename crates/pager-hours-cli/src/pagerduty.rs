//! PagerDuty REST API (v2) provider.
//!
//! The API token is passed in by the CLI; it is never logged.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, SecondsFormat, Utc};
use pager_hours_core::{Incident, ScheduleSegment, UserDetails};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::provider::{EscalationPolicy, OnCallProvider, Service};

pub const DEFAULT_API_URL: &str = "https://api.pagerduty.com";

const ACCEPT_V2: &str = "application/vnd.pagerduty+json;version=2";
const PAGE_LIMIT: usize = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct PagerDutyClient {
    token: String,
    http: reqwest::blocking::Client,
    base_url: String,
}

impl PagerDutyClient {
    pub fn new_with_base_url(token: String, base_url: String) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("pagerduty http client build failed")?;
        Ok(Self {
            token,
            http,
            base_url,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        debug!(path, "pagerduty request");
        let resp = self
            .http
            .get(self.url(path))
            .header(AUTHORIZATION, format!("Token token={}", self.token))
            .header(ACCEPT, ACCEPT_V2)
            .query(query)
            .send()
            .with_context(|| format!("GET /{} request failed", path))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(anyhow!(
                "GET /{} http error status={} body={}",
                path,
                status.as_u16(),
                body.trim()
            ));
        }

        resp.json()
            .with_context(|| format!("GET /{} response json decode failed", path))
    }

    /// Follow `offset`/`more` pagination until the API reports the last page.
    fn paginate<P, T>(
        &self,
        path: &str,
        query: &[(&str, String)],
        split: impl Fn(P) -> (Vec<T>, bool),
    ) -> Result<Vec<T>>
    where
        P: DeserializeOwned,
    {
        let mut out = Vec::new();
        let mut offset: usize = 0;

        loop {
            let mut page_query = query.to_vec();
            page_query.push(("limit", PAGE_LIMIT.to_string()));
            page_query.push(("offset", offset.to_string()));

            let (items, more) = split(self.get(path, &page_query)?);
            let received = items.len();
            out.extend(items);

            if !more {
                break;
            }
            if received == 0 {
                bail!(
                    "GET /{} reported more results after offset {} but returned an empty page",
                    path,
                    offset
                );
            }
            offset += received;
        }

        Ok(out)
    }
}

impl OnCallProvider for PagerDutyClient {
    fn escalation_policies(&self) -> Result<Vec<EscalationPolicy>> {
        let payloads = self.paginate("escalation_policies", &[], |page: PolicyList| {
            (page.escalation_policies, page.more)
        })?;
        Ok(payloads.into_iter().map(EscalationPolicy::from).collect())
    }

    fn escalation_policy(&self, id: &str) -> Result<EscalationPolicy> {
        let envelope: PolicyEnvelope = self.get(&format!("escalation_policies/{}", id), &[])?;
        Ok(envelope.escalation_policy.into())
    }

    fn schedule_entries(
        &self,
        schedule_id: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<ScheduleSegment>> {
        let query = [
            ("since", timestamp(since)),
            ("until", timestamp(until)),
            ("time_zone", "UTC".to_string()),
        ];
        let envelope: ScheduleEnvelope = self.get(&format!("schedules/{}", schedule_id), &query)?;
        Ok(envelope
            .schedule
            .final_schedule
            .rendered_schedule_entries
            .into_iter()
            .map(ScheduleSegment::from)
            .collect())
    }

    fn incidents(
        &self,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
        service_ids: &[String],
    ) -> Result<Vec<Incident>> {
        let mut query = vec![
            ("since", timestamp(since)),
            ("until", timestamp(until)),
            ("time_zone", "UTC".to_string()),
        ];
        query.extend(service_ids.iter().map(|id| ("service_ids[]", id.clone())));

        let payloads = self.paginate("incidents", &query, |page: IncidentList| {
            (page.incidents, page.more)
        })?;
        Ok(payloads.into_iter().map(Incident::from).collect())
    }

    fn user(&self, id: &str) -> Result<UserDetails> {
        let envelope: UserEnvelope = self.get(&format!("users/{}", id), &[])?;
        Ok(envelope.user)
    }
}

fn timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Clone, Deserialize)]
struct Reference {
    id: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

impl Reference {
    fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.summary.clone())
    }

    fn is_schedule(&self) -> bool {
        matches!(self.kind.as_str(), "schedule" | "schedule_reference")
    }
}

#[derive(Debug, Deserialize)]
struct PolicyList {
    escalation_policies: Vec<PolicyPayload>,
    #[serde(default)]
    more: bool,
}

#[derive(Debug, Deserialize)]
struct PolicyEnvelope {
    escalation_policy: PolicyPayload,
}

#[derive(Debug, Deserialize)]
struct PolicyPayload {
    id: String,
    name: String,
    #[serde(default)]
    services: Vec<Reference>,
    #[serde(default)]
    escalation_rules: Vec<RulePayload>,
}

#[derive(Debug, Deserialize)]
struct RulePayload {
    #[serde(default)]
    targets: Vec<Reference>,
}

impl From<PolicyPayload> for EscalationPolicy {
    fn from(payload: PolicyPayload) -> Self {
        let services = payload
            .services
            .iter()
            .map(|s| Service {
                id: s.id.clone(),
                name: s.display_name(),
            })
            .collect();
        let schedule_ids = payload
            .escalation_rules
            .iter()
            .flat_map(|rule| rule.targets.iter())
            .filter(|target| target.is_schedule())
            .map(|target| target.id.clone())
            .collect();

        EscalationPolicy {
            id: payload.id,
            name: payload.name,
            services,
            schedule_ids,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScheduleEnvelope {
    schedule: SchedulePayload,
}

#[derive(Debug, Deserialize)]
struct SchedulePayload {
    final_schedule: FinalSchedule,
}

#[derive(Debug, Deserialize)]
struct FinalSchedule {
    #[serde(default)]
    rendered_schedule_entries: Vec<EntryPayload>,
}

#[derive(Debug, Deserialize)]
struct EntryPayload {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    user: Reference,
}

impl From<EntryPayload> for ScheduleSegment {
    fn from(entry: EntryPayload) -> Self {
        // Schedule entries only reference the user; the email is attached
        // once the user has been looked up.
        ScheduleSegment {
            user_email: entry.user.email.clone().unwrap_or_default(),
            user_id: entry.user.id,
            start: entry.start,
            end: entry.end,
        }
    }
}

#[derive(Debug, Deserialize)]
struct IncidentList {
    incidents: Vec<IncidentPayload>,
    #[serde(default)]
    more: bool,
}

#[derive(Debug, Deserialize)]
struct IncidentPayload {
    created_at: DateTime<Utc>,
    escalation_policy: Reference,
}

impl From<IncidentPayload> for Incident {
    fn from(payload: IncidentPayload) -> Self {
        Incident {
            created_at: payload.created_at,
            escalation_policy_id: payload.escalation_policy.id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    user: UserDetails,
}

// -----------------
// Tests (no network)
// -----------------
