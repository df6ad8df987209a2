use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::JoinHandle;

use crate::api::{ApiClient, NewApplication, RefereeNotification};
use crate::cache::Snapshot;
use crate::models::Application;

/// What a refresh should pull, per role.
#[derive(Debug, Clone)]
pub enum RefreshScope {
    /// Profile looked up by the session email, jobs, and only this
    /// candidate's applications.
    Seeker { email: String },
    /// Jobs and all applications.
    Employer,
    /// Jobs, all applications, and the candidate roster.
    Admin,
}

#[derive(Debug)]
pub enum FetchRequest {
    Refresh { seq: u64, scope: RefreshScope },
    Submit {
        payload: NewApplication,
        notify: RefereeNotification,
    },
    Approve { id: String },
    Reject { id: String },
    Shutdown,
}

#[derive(Debug)]
pub enum FetchOutcome {
    Snapshot {
        seq: u64,
        result: Result<Snapshot, String>,
    },
    Submitted {
        result: Result<Application, String>,
        /// Set when the application went through but the referee
        /// notification did not. Never rolls the application back.
        referee_warning: Option<String>,
    },
    Mutated {
        id: String,
        action: &'static str,
        result: Result<(), String>,
    },
}

/// Background worker owning the ApiClient. The UI thread sends requests and
/// polls outcomes; network calls never run on the UI thread. Queued
/// refreshes are coalesced so only the newest one is fetched; mutations are
/// processed in order.
pub struct Fetcher {
    tx: Sender<FetchRequest>,
    rx: Receiver<FetchOutcome>,
    handle: Option<JoinHandle<()>>,
}

impl Fetcher {
    pub fn spawn(api: ApiClient) -> Self {
        let (tx, req_rx) = mpsc::channel::<FetchRequest>();
        let (out_tx, rx) = mpsc::channel::<FetchOutcome>();
        let handle = std::thread::spawn(move || worker_loop(api, req_rx, out_tx));
        Self {
            tx,
            rx,
            handle: Some(handle),
        }
    }

    pub fn send(&self, request: FetchRequest) {
        // A closed channel means the worker already exited; the dashboard
        // is tearing down anyway.
        let _ = self.tx.send(request);
    }

    pub fn try_recv(&self) -> Option<FetchOutcome> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

impl Drop for Fetcher {
    fn drop(&mut self) {
        let _ = self.tx.send(FetchRequest::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        tracing::debug!("fetch worker stopped");
    }
}

/// Split a drained batch of requests into the newest refresh, the mutations
/// in arrival order, and whether a shutdown was requested. Superseded
/// refreshes are dropped here, never queued.
fn coalesce(
    requests: impl IntoIterator<Item = FetchRequest>,
) -> (Option<(u64, RefreshScope)>, Vec<FetchRequest>, bool) {
    let mut refresh: Option<(u64, RefreshScope)> = None;
    let mut mutations: Vec<FetchRequest> = Vec::new();
    let mut shutdown = false;
    for request in requests {
        match request {
            FetchRequest::Refresh { seq, scope } => {
                if refresh.as_ref().map(|(s, _)| seq > *s).unwrap_or(true) {
                    refresh = Some((seq, scope));
                }
            }
            FetchRequest::Shutdown => shutdown = true,
            other => mutations.push(other),
        }
    }
    (refresh, mutations, shutdown)
}

fn worker_loop(api: ApiClient, rx: Receiver<FetchRequest>, tx: Sender<FetchOutcome>) {
    tracing::debug!("fetch worker started");
    loop {
        let Ok(first) = rx.recv() else { return };

        let (refresh, mutations, shutdown) = coalesce(
            std::iter::once(first).chain(std::iter::from_fn(|| rx.try_recv().ok())),
        );

        for request in mutations {
            let outcome = match request {
                FetchRequest::Submit { payload, notify } => submit(&api, &payload, &notify),
                FetchRequest::Approve { id } => FetchOutcome::Mutated {
                    result: api.approve_application(&id).map_err(|e| e.to_string()),
                    id,
                    action: "approve",
                },
                FetchRequest::Reject { id } => FetchOutcome::Mutated {
                    result: api.reject_application(&id).map_err(|e| e.to_string()),
                    id,
                    action: "reject",
                },
                FetchRequest::Refresh { .. } | FetchRequest::Shutdown => unreachable!(),
            };
            if tx.send(outcome).is_err() {
                return;
            }
        }

        if let Some((seq, scope)) = refresh {
            let result = fetch_snapshot(&api, &scope).map_err(|e| e.to_string());
            if let Err(message) = &result {
                tracing::warn!(seq, "snapshot fetch failed: {message}");
            }
            if tx.send(FetchOutcome::Snapshot { seq, result }).is_err() {
                return;
            }
        }

        if shutdown {
            return;
        }
    }
}

fn fetch_snapshot(api: &ApiClient, scope: &RefreshScope) -> Result<Snapshot, crate::error::ApiError> {
    match scope {
        RefreshScope::Seeker { email } => {
            let profile = api.find_profile(email)?;
            let jobs = api.list_jobs()?;
            let applications = match &profile {
                Some(p) => {
                    let mine = p.id.clone();
                    api.list_applications()?
                        .into_iter()
                        .filter(|a| a.candidate_id == mine)
                        .collect()
                }
                None => Vec::new(),
            };
            Ok(Snapshot {
                profile,
                jobs,
                applications,
                candidates: Vec::new(),
            })
        }
        RefreshScope::Employer => Ok(Snapshot {
            profile: None,
            jobs: api.list_jobs()?,
            applications: api.list_applications()?,
            candidates: Vec::new(),
        }),
        RefreshScope::Admin => Ok(Snapshot {
            profile: None,
            jobs: api.list_jobs()?,
            applications: api.list_applications()?,
            candidates: api.list_candidates()?,
        }),
    }
}

fn submit(
    api: &ApiClient,
    payload: &NewApplication,
    notify: &RefereeNotification,
) -> FetchOutcome {
    match api.create_application(payload) {
        Ok(application) => {
            // Secondary effect: failure here is a warning, not a rollback.
            let referee_warning = match api.send_referee_emails(notify) {
                Ok(()) => None,
                Err(e) => {
                    tracing::warn!("referee notification failed: {e}");
                    Some(format!("application submitted, but referee notification failed: {e}"))
                }
            };
            FetchOutcome::Submitted {
                result: Ok(application),
                referee_warning,
            }
        }
        Err(e) => FetchOutcome::Submitted {
            result: Err(e.to_string()),
            referee_warning: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refresh(seq: u64) -> FetchRequest {
        FetchRequest::Refresh {
            seq,
            scope: RefreshScope::Employer,
        }
    }

    #[test]
    fn coalesce_keeps_only_the_newest_refresh() {
        let (refresh, mutations, shutdown) =
            coalesce(vec![refresh(1), refresh(2), refresh(3)]);
        assert!(matches!(refresh, Some((3, _))));
        assert!(mutations.is_empty());
        assert!(!shutdown);
    }

    #[test]
    fn coalesce_preserves_mutations_in_order() {
        let (refresh, mutations, shutdown) = coalesce(vec![
            FetchRequest::Approve { id: "a1".into() },
            refresh(5),
            FetchRequest::Reject { id: "a2".into() },
        ]);
        assert!(matches!(refresh, Some((5, _))));
        assert_eq!(mutations.len(), 2);
        assert!(matches!(&mutations[0], FetchRequest::Approve { id } if id == "a1"));
        assert!(matches!(&mutations[1], FetchRequest::Reject { id } if id == "a2"));
        assert!(!shutdown);
    }

    #[test]
    fn coalesce_flags_shutdown() {
        let (refresh, mutations, shutdown) = coalesce(vec![FetchRequest::Shutdown]);
        assert!(refresh.is_none());
        assert!(mutations.is_empty());
        assert!(shutdown);
    }
}
