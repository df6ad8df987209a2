use std::time::{Duration, Instant};

use chrono::{DateTime, Datelike, Utc};

use crate::models::{Application, ApplicationStatus, Job, Profile, Stats};

/// How a dashboard refreshes itself. The employer dashboard polls on an
/// interval; the seeker and admin dashboards fetch once on mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPolicy {
    Once,
    Every(Duration),
}

impl PollPolicy {
    pub fn due(&self, last_refresh: Option<Instant>) -> bool {
        match (self, last_refresh) {
            (_, None) => true,
            (PollPolicy::Once, Some(_)) => false,
            (PollPolicy::Every(interval), Some(at)) => at.elapsed() >= *interval,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Idle,
    Loading,
    Ready,
    /// Only reachable when the very first load fails; after that, failed
    /// refreshes keep the previous data and set the banner instead.
    Error,
}

/// One full re-fetch of the collections a dashboard renders from.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub profile: Option<Profile>,
    pub jobs: Vec<Job>,
    pub applications: Vec<Application>,
    pub candidates: Vec<Profile>,
}

/// In-memory copy of the backend collections for one dashboard instance.
/// The backend stays the source of truth; this cache is only trusted until
/// the next refresh. Snapshots carry a monotonic sequence number so a slow
/// early fetch can never overwrite a fast later one.
pub struct EntityCache {
    state: CacheState,
    pub profile: Option<Profile>,
    pub jobs: Vec<Job>,
    pub applications: Vec<Application>,
    pub candidates: Vec<Profile>,
    banner: Option<String>,
    next_seq: u64,
    applied_seq: u64,
}

impl EntityCache {
    pub fn new() -> Self {
        Self {
            state: CacheState::Idle,
            profile: None,
            jobs: Vec::new(),
            applications: Vec::new(),
            candidates: Vec::new(),
            banner: None,
            next_seq: 0,
            applied_seq: 0,
        }
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Reserve a sequence number for a refresh about to be issued. Any
    /// still-running older refresh is superseded by this one.
    pub fn begin_refresh(&mut self) -> u64 {
        self.next_seq += 1;
        // A retry after a failed first load is loading again, not stuck
        // in the error state.
        if matches!(self.state, CacheState::Idle | CacheState::Error) {
            self.state = CacheState::Loading;
        }
        self.next_seq
    }

    /// Apply a completed snapshot. Returns false (and changes nothing) when
    /// a newer snapshot has already been applied.
    pub fn apply(&mut self, seq: u64, snapshot: Snapshot) -> bool {
        if seq <= self.applied_seq {
            tracing::debug!(seq, applied = self.applied_seq, "dropping stale snapshot");
            return false;
        }
        self.applied_seq = seq;
        self.profile = snapshot.profile;
        self.jobs = snapshot.jobs;
        self.applications = snapshot.applications;
        self.candidates = snapshot.candidates;
        self.state = CacheState::Ready;
        self.banner = None;
        true
    }

    /// A refresh failed. Previous data is kept; the failure is surfaced as
    /// a banner rather than a blocking alert.
    pub fn fail(&mut self, seq: u64, message: &str) {
        if seq <= self.applied_seq {
            return;
        }
        tracing::warn!(seq, "refresh failed: {message}");
        self.banner = Some(format!("refresh failed: {message}"));
        if self.state == CacheState::Loading {
            self.state = if self.applied_seq == 0 {
                CacheState::Error
            } else {
                CacheState::Ready
            };
        }
    }

    /// Append a record we just created, so the UI reflects it before the
    /// next poll confirms it.
    pub fn push_application(&mut self, app: Application) {
        self.applications.push(app);
    }

    pub fn is_applied(&self, job_id: &str) -> bool {
        self.applications.iter().any(|a| a.job_id == job_id)
    }

    pub fn pending(&self) -> Vec<&Application> {
        self.applications
            .iter()
            .filter(|a| a.status != ApplicationStatus::Approved)
            .collect()
    }

    pub fn approved(&self) -> Vec<&Application> {
        self.applications
            .iter()
            .filter(|a| a.status == ApplicationStatus::Approved)
            .collect()
    }

    pub fn job(&self, job_id: &str) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == job_id)
    }

    pub fn stats(&self, now: DateTime<Utc>) -> Stats {
        let hired_this_month = self
            .applications
            .iter()
            .filter(|a| a.status == ApplicationStatus::Hired)
            .filter(|a| {
                a.hired_at
                    .map(|t| t.year() == now.year() && t.month() == now.month())
                    .unwrap_or(false)
            })
            .count();
        Stats {
            active_jobs: self.jobs.len(),
            total_applications: self.applications.len(),
            interviews_scheduled: self
                .applications
                .iter()
                .filter(|a| a.status == ApplicationStatus::Interviewing)
                .count(),
            hired_this_month,
        }
    }
}

impl Default for EntityCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn job(id: &str) -> Job {
        serde_json::from_str(&format!(r#"{{"id":"{id}","title":"Job {id}"}}"#)).unwrap()
    }

    fn app(id: &str, job_id: &str, status: &str) -> Application {
        serde_json::from_str(&format!(
            r#"{{"id":"{id}","candidate_id":"c1","job_id":"{job_id}","status":"{status}"}}"#
        ))
        .unwrap()
    }

    #[test]
    fn first_refresh_moves_idle_to_loading_to_ready() {
        let mut cache = EntityCache::new();
        assert_eq!(cache.state(), CacheState::Idle);

        let seq = cache.begin_refresh();
        assert_eq!(cache.state(), CacheState::Loading);

        assert!(cache.apply(
            seq,
            Snapshot {
                jobs: vec![job("j1")],
                ..Default::default()
            }
        ));
        assert_eq!(cache.state(), CacheState::Ready);
        assert_eq!(cache.jobs.len(), 1);
    }

    #[test]
    fn stale_snapshot_never_overwrites_newer_one() {
        let mut cache = EntityCache::new();
        let slow = cache.begin_refresh();
        let fast = cache.begin_refresh();

        assert!(cache.apply(
            fast,
            Snapshot {
                jobs: vec![job("j1"), job("j2")],
                ..Default::default()
            }
        ));
        // The slower, earlier fetch finishes afterwards and must be dropped.
        assert!(!cache.apply(
            slow,
            Snapshot {
                jobs: vec![job("j1")],
                ..Default::default()
            }
        ));
        assert_eq!(cache.jobs.len(), 2);
    }

    #[test]
    fn failed_refresh_keeps_previous_data_and_sets_banner() {
        let mut cache = EntityCache::new();
        let seq = cache.begin_refresh();
        cache.apply(
            seq,
            Snapshot {
                jobs: vec![job("j1")],
                applications: vec![app("a1", "j1", "Pending")],
                ..Default::default()
            },
        );

        let seq = cache.begin_refresh();
        cache.fail(seq, "connection refused");
        assert_eq!(cache.state(), CacheState::Ready);
        assert_eq!(cache.jobs.len(), 1);
        assert_eq!(cache.applications.len(), 1);
        assert!(cache.banner().unwrap().contains("connection refused"));
    }

    #[test]
    fn first_load_failure_is_an_error_state() {
        let mut cache = EntityCache::new();
        let seq = cache.begin_refresh();
        cache.fail(seq, "offline");
        assert_eq!(cache.state(), CacheState::Error);
    }

    #[test]
    fn retry_after_first_load_failure_is_loading_again() {
        let mut cache = EntityCache::new();
        let seq = cache.begin_refresh();
        cache.fail(seq, "offline");
        assert_eq!(cache.state(), CacheState::Error);

        let seq = cache.begin_refresh();
        assert_eq!(cache.state(), CacheState::Loading);

        // A second failure with still nothing loaded goes back to Error.
        cache.fail(seq, "offline");
        assert_eq!(cache.state(), CacheState::Error);

        let seq = cache.begin_refresh();
        assert!(cache.apply(
            seq,
            Snapshot {
                jobs: vec![job("j1")],
                ..Default::default()
            }
        ));
        assert_eq!(cache.state(), CacheState::Ready);
    }

    #[test]
    fn derived_filters() {
        let mut cache = EntityCache::new();
        let seq = cache.begin_refresh();
        cache.apply(
            seq,
            Snapshot {
                applications: vec![
                    app("a1", "j1", "Pending"),
                    app("a2", "j2", "Approved"),
                    app("a3", "j3", "Interviewing"),
                ],
                ..Default::default()
            },
        );

        assert_eq!(cache.pending().len(), 2);
        assert_eq!(cache.approved().len(), 1);
        assert!(cache.is_applied("j1"));
        assert!(!cache.is_applied("j9"));
    }

    #[test]
    fn applied_stays_true_after_creation() {
        let mut cache = EntityCache::new();
        assert!(!cache.is_applied("J1"));
        cache.push_application(app("a1", "J1", "Pending"));
        assert!(cache.is_applied("J1"));
        assert_eq!(cache.applications[0].status, ApplicationStatus::Pending);
    }

    #[test]
    fn stats_match_cached_collections() {
        let now = Utc.with_ymd_and_hms(2026, 8, 29, 12, 0, 0).unwrap();
        let mut cache = EntityCache::new();
        let mut hired_now = app("a3", "j3", "Hired");
        hired_now.hired_at = Some(Utc.with_ymd_and_hms(2026, 8, 3, 9, 0, 0).unwrap());
        let mut hired_before = app("a4", "j4", "Hired");
        hired_before.hired_at = Some(Utc.with_ymd_and_hms(2026, 7, 30, 9, 0, 0).unwrap());

        let seq = cache.begin_refresh();
        cache.apply(
            seq,
            Snapshot {
                jobs: vec![job("j1"), job("j2")],
                applications: vec![
                    app("a1", "j1", "Pending"),
                    app("a2", "j2", "Interviewing"),
                    hired_now,
                    hired_before,
                ],
                ..Default::default()
            },
        );

        let stats = cache.stats(now);
        assert_eq!(stats.active_jobs, 2);
        assert_eq!(stats.total_applications, cache.applications.len());
        assert_eq!(stats.interviews_scheduled, 1);
        assert_eq!(stats.hired_this_month, 1);
    }

    #[test]
    fn poll_policy_due() {
        assert!(PollPolicy::Once.due(None));
        assert!(!PollPolicy::Once.due(Some(Instant::now())));

        let every = PollPolicy::Every(Duration::from_millis(1));
        assert!(every.due(None));
        let past = Instant::now() - Duration::from_secs(1);
        assert!(every.due(Some(past)));
        assert!(!PollPolicy::Every(Duration::from_secs(3600)).due(Some(Instant::now())));
    }
}
