//! Hour aggregation.
//!
//! Schedule segments are walked hour by hour. Each hour is classified
//! on the user's local clock and counted into a (user, bucket) cell.
//! Cells belong to the UTC day of the iteration cursor: as soon as an
//! hour of a later day arrives, every cell of the open day is emitted
//! as a [`ReportRow`] and the state is cleared for all users at once.
//!
//! The aggregator never performs I/O. Users must be resolved into a
//! [`Roster`] and incidents indexed into an [`IncidentIndex`] first.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use tracing::{debug, trace};

use crate::classify::BucketClassifier;
use crate::error::{PagerHoursError, Result};
use crate::holidays::HolidayCalendar;
use crate::models::{
    Bucket, HourWindow, Incident, Region, ReportConfig, ReportRow, ScheduleSegment, UserDetails,
    Worker, Workload,
};
use crate::tz::RegionTable;

/// UTC (day, hour-of-day) slots in which at least one incident was created.
#[derive(Debug, Clone, Default)]
pub struct IncidentIndex {
    slots: HashSet<(NaiveDate, u32)>,
}

impl IncidentIndex {
    /// Index the incidents escalated through `policy_id`; others are ignored.
    pub fn new(incidents: &[Incident], policy_id: &str) -> Self {
        let slots = incidents
            .iter()
            .filter(|incident| incident.escalation_policy_id == policy_id)
            .map(|incident| slot(incident.created_at))
            .collect();
        Self { slots }
    }

    /// Whether any incident was created in the UTC hour containing `instant`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.slots.contains(&slot(instant))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

fn slot(instant: DateTime<Utc>) -> (NaiveDate, u32) {
    (instant.date_naive(), instant.hour())
}

/// Users resolved to their timezone and region, keyed by user id.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    workers: HashMap<String, Worker>,
}

impl Roster {
    /// Resolve every user through `table`.
    ///
    /// A single unmapped timezone fails the whole roster.
    pub fn resolve<'a>(
        users: impl IntoIterator<Item = &'a UserDetails>,
        table: &RegionTable,
    ) -> Result<Self> {
        let mut roster = Self::default();
        for user in users {
            let worker = table.resolve(user)?;
            debug!(user = %worker.email, region = %worker.region, tz = %worker.time_zone, "resolved worker");
            roster.insert(worker);
        }
        Ok(roster)
    }

    pub fn insert(&mut self, worker: Worker) {
        self.workers.insert(worker.id.clone(), worker);
    }

    pub fn get(&self, user_id: &str) -> Result<&Worker> {
        self.workers
            .get(user_id)
            .ok_or_else(|| PagerHoursError::UnknownUser(user_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}

/// One classified on-call hour.
#[derive(Debug, Clone, Copy)]
pub struct HourEvent<'a> {
    /// Start of the hour in UTC.
    pub instant: DateTime<Utc>,
    pub worker: &'a Worker,
    pub bucket: Bucket,
    /// An incident was created during this hour.
    pub incident: bool,
}

#[derive(Debug, Clone)]
struct Cell {
    time_zone: &'static str,
    region: Region,
    workload: Workload,
}

/// Accumulates hour events for the open UTC day.
///
/// Feed events through [`HourAggregator::step`] in non-decreasing day
/// order and call [`HourAggregator::finish`] at the end of the stream.
#[derive(Debug)]
pub struct HourAggregator {
    night: HourWindow,
    open_day: Option<NaiveDate>,
    cells: BTreeMap<(String, Bucket), Cell>,
}

impl HourAggregator {
    pub fn new(night: HourWindow) -> Self {
        Self {
            night,
            open_day: None,
            cells: BTreeMap::new(),
        }
    }

    /// The UTC day currently being accumulated.
    pub fn open_day(&self) -> Option<NaiveDate> {
        self.open_day
    }

    /// Count one hour, returning the rows of the previous day if this
    /// hour opened a new one.
    pub fn step(&mut self, event: HourEvent<'_>) -> Result<Vec<ReportRow>> {
        let day = event.instant.date_naive();

        let open = self.open_day;
        let flushed = match open {
            Some(open_day) if day < open_day => {
                return Err(PagerHoursError::OutOfOrder { open_day, day });
            }
            Some(open_day) if day > open_day => self.flush(open_day),
            _ => Vec::new(),
        };
        self.open_day = Some(day);

        let worker = event.worker;
        let cell = self
            .cells
            .entry((worker.email.clone(), event.bucket))
            .or_insert_with(|| Cell {
                time_zone: worker.time_zone.name(),
                region: worker.region,
                workload: Workload::default(),
            });

        cell.workload.oncall += 1;
        if event.incident {
            if self.night.contains(event.instant.hour()) {
                cell.workload.incidents_night += 1;
            } else {
                cell.workload.incidents_day += 1;
            }
        }

        Ok(flushed)
    }

    /// Emit whatever is still open.
    pub fn finish(mut self) -> Vec<ReportRow> {
        match self.open_day.take() {
            Some(day) => self.flush(day),
            None => Vec::new(),
        }
    }

    fn flush(&mut self, day: NaiveDate) -> Vec<ReportRow> {
        let rows: Vec<ReportRow> = std::mem::take(&mut self.cells)
            .into_iter()
            .filter(|(_, cell)| !cell.workload.is_empty())
            .map(|((email, bucket), cell)| ReportRow {
                date: day,
                email,
                time_zone: cell.time_zone.to_string(),
                region: cell.region,
                bucket,
                workload: cell.workload,
            })
            .collect();
        debug!(day = %day, rows = rows.len(), "flushed day");
        rows
    }
}

/// Walk `segments` hour by hour and aggregate them into report rows.
///
/// Segments are processed in the order given; each one is walked to its
/// end before the next begins. Overlapping segments are all counted.
///
/// # Errors
///
/// Fails on a user missing from `roster`, a holiday-calendar data gap,
/// or a segment that starts on a UTC day already flushed.
pub fn aggregate_segments(
    segments: &[ScheduleSegment],
    roster: &Roster,
    incidents: &IncidentIndex,
    calendar: &HolidayCalendar,
    config: &ReportConfig,
) -> Result<Vec<ReportRow>> {
    let classifier = BucketClassifier::new(calendar.clone(), config.office_hours);
    let mut aggregator = HourAggregator::new(config.night);
    let mut rows = Vec::new();

    for segment in segments {
        let worker = roster.get(&segment.user_id)?;
        trace!(user = %worker.email, start = %segment.start, end = %segment.end, "walking segment");

        for instant in segment.hours() {
            let event = HourEvent {
                instant,
                worker,
                bucket: classifier.bucket_for_worker(instant, worker)?,
                incident: incidents.contains(instant),
            };
            rows.extend(aggregator.step(event)?);
        }
    }

    rows.extend(aggregator.finish());
    Ok(rows)
}
