use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User roles as the backend spells them on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Candidate,
    Employer,
    Admin,
}

impl Role {
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "candidate" => Some(Role::Candidate),
            "employer" => Some(Role::Employer),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Candidate => "candidate",
            Role::Employer => "employer",
            Role::Admin => "admin",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Role::Candidate => "Job Seeker",
            Role::Employer => "Employer",
            Role::Admin => "Admin",
        }
    }
}

/// The authenticated user. A persisted record without a recognizable role
/// is treated as no session at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub skills: Option<String>, // comma-separated, as the backend stores it
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub portfolio: Option<String>,
}

impl Profile {
    pub fn skill_list(&self) -> Vec<String> {
        self.skills
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "type", default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub salary_min: Option<i64>,
    #[serde(default)]
    pub salary_max: Option<i64>,
    #[serde(default)]
    pub skills_required: Option<String>,
    #[serde(default)]
    pub hot: bool,
}

impl Job {
    pub fn salary_display(&self) -> String {
        match (self.salary_min, self.salary_max) {
            (Some(min), Some(max)) => format!("${} - ${}", min, max),
            (Some(min), None) => format!("${}+", min),
            (None, Some(max)) => format!("up to ${}", max),
            (None, None) => "-".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    // The backend's insert default is "Applied"; it means the same thing.
    #[serde(alias = "Applied")]
    Pending,
    Interviewing,
    Approved,
    Hired,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Interviewing => "Interviewing",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::Hired => "Hired",
            ApplicationStatus::Rejected => "Rejected",
        }
    }
}

impl Default for ApplicationStatus {
    fn default() -> Self {
        ApplicationStatus::Pending
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub candidate_id: String,
    pub job_id: String,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default)]
    pub referee1_name: Option<String>,
    #[serde(default)]
    pub referee1_email: Option<String>,
    #[serde(default)]
    pub referee2_name: Option<String>,
    #[serde(default)]
    pub referee2_email: Option<String>,
    #[serde(default)]
    pub hired_at: Option<DateTime<Utc>>,
}

/// Dashboard counters. Pure projections of the cached collections,
/// recomputed on every refresh and never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub active_jobs: usize,
    pub total_applications: usize,
    pub interviews_scheduled: usize,
    pub hired_this_month: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_names_round_trip() {
        for (s, role) in [
            ("candidate", Role::Candidate),
            ("employer", Role::Employer),
            ("admin", Role::Admin),
        ] {
            assert_eq!(Role::parse(s), Some(role));
            assert_eq!(role.as_str(), s);
        }
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn skill_list_splits_and_trims() {
        let p = Profile {
            id: "1".into(),
            name: "Sarah Okello".into(),
            email: "sarah@example.com".into(),
            skills: Some("React, Rust , ".into()),
            experience: None,
            education: None,
            portfolio: None,
        };
        assert_eq!(p.skill_list(), vec!["React".to_string(), "Rust".to_string()]);
    }

    #[test]
    fn application_status_defaults_to_pending() {
        let app: Application = serde_json::from_str(
            r#"{"id":"a1","candidate_id":"c1","job_id":"j1","status":"Interviewing"}"#,
        )
        .unwrap();
        assert_eq!(app.status, ApplicationStatus::Interviewing);

        let app: Application =
            serde_json::from_str(r#"{"id":"a2","candidate_id":"c1","job_id":"j1"}"#).unwrap();
        assert_eq!(app.status, ApplicationStatus::Pending);

        // The backend's insert default.
        let app: Application = serde_json::from_str(
            r#"{"id":"a3","candidate_id":"c1","job_id":"j1","status":"Applied"}"#,
        )
        .unwrap();
        assert_eq!(app.status, ApplicationStatus::Pending);
    }

    #[test]
    fn job_salary_display() {
        let mut job: Job = serde_json::from_str(
            r#"{"id":"j1","title":"Frontend Developer","salary_min":800,"salary_max":1500}"#,
        )
        .unwrap();
        assert_eq!(job.salary_display(), "$800 - $1500");
        job.salary_max = None;
        assert_eq!(job.salary_display(), "$800+");
        job.salary_min = None;
        assert_eq!(job.salary_display(), "-");
    }
}
