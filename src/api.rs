use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::multipart;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::models::{Application, Job, Profile};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Thin typed client over the JobLink REST backend. One method per
/// endpoint, no retries; callers decide what a failure means.
pub struct ApiClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployerRegistration {
    #[serde(rename = "companyName")]
    pub company_name: String,
    pub email: String,
    pub industry: String,
    #[serde(rename = "jobOpenings")]
    pub job_openings: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct CandidateRegistration {
    pub name: String,
    pub email: String,
    pub skills: String,
    pub experience: String,
    pub education: String,
    pub portfolio: String,
    pub password: String,
    pub resume: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewJob {
    pub title: String,
    pub department: String,
    pub description: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub experience_required: String,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub skills_required: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewApplication {
    pub email: String,
    pub job_id: String,
    pub cover_letter: String,
    pub referee1_name: String,
    pub referee1_email: String,
    pub referee2_name: String,
    pub referee2_email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefereeNotification {
    pub applicant_name: String,
    pub referees: Vec<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::blocking::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }

    fn check_status(response: reqwest::blocking::Response) -> Result<(), ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    pub fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let response = self
            .client
            .post(self.url("/api/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()?;
        // The backend answers 401 with a JSON body on bad credentials;
        // surface that as a parsed response, not a transport error.
        let status = response.status();
        let body = response.text()?;
        if status.as_u16() == 401 || status.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }
        Err(ApiError::Http {
            status: status.as_u16(),
            body,
        })
    }

    pub fn register_candidate(&self, reg: &CandidateRegistration) -> Result<(), ApiError> {
        let mut form = multipart::Form::new()
            .text("name", reg.name.clone())
            .text("email", reg.email.clone())
            .text("skills", reg.skills.clone())
            .text("experience", reg.experience.clone())
            .text("education", reg.education.clone())
            .text("portfolio", reg.portfolio.clone())
            .text("password", reg.password.clone());
        if let Some(resume) = &reg.resume {
            form = form.file("resume", resume)?;
        }
        let response = self
            .client
            .post(self.url("/register/candidate"))
            .multipart(form)
            .send()?;
        Self::check_status(response)
    }

    pub fn register_employer(&self, reg: &EmployerRegistration) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/register/employer"))
            .json(reg)
            .send()?;
        Self::check_status(response)
    }

    pub fn list_candidates(&self) -> Result<Vec<Profile>, ApiError> {
        let response = self.client.get(self.url("/candidates")).send()?;
        Self::read_json(response)
    }

    pub fn list_jobs(&self) -> Result<Vec<Job>, ApiError> {
        let response = self.client.get(self.url("/jobs")).send()?;
        Self::read_json(response)
    }

    pub fn create_job(&self, job: &NewJob) -> Result<(), ApiError> {
        let response = self.client.post(self.url("/jobs")).json(job).send()?;
        Self::check_status(response)
    }

    pub fn list_applications(&self) -> Result<Vec<Application>, ApiError> {
        let response = self.client.get(self.url("/applications")).send()?;
        Self::read_json(response)
    }

    /// The backend answers the insert with a one-element array.
    pub fn create_application(&self, app: &NewApplication) -> Result<Application, ApiError> {
        let response = self
            .client
            .post(self.url("/applications"))
            .json(app)
            .send()?;
        let created: Vec<Application> = Self::read_json(response)?;
        created.into_iter().next().ok_or(ApiError::Http {
            status: 201,
            body: "backend returned an empty record set for the new application".to_string(),
        })
    }

    pub fn approve_application(&self, id: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url(&format!("/applications/{}/approve", id)))
            .send()?;
        Self::check_status(response)
    }

    pub fn reject_application(&self, id: &str) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url(&format!("/applications/{}/reject", id)))
            .send()?;
        Self::check_status(response)
    }

    pub fn send_referee_emails(&self, note: &RefereeNotification) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/send_referee_emails"))
            .json(note)
            .send()?;
        Self::check_status(response)
    }

    /// Lookup by the session email instead of taking the first record the
    /// backend happens to return.
    pub fn find_profile(&self, email: &str) -> Result<Option<Profile>, ApiError> {
        let candidates = self.list_candidates()?;
        Ok(candidates
            .into_iter()
            .find(|c| c.email.eq_ignore_ascii_case(email)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let client = ApiClient::new("http://localhost:5000/").unwrap();
        assert_eq!(client.url("/jobs"), "http://localhost:5000/jobs");
        assert_eq!(
            client.url("/applications/a1/approve"),
            "http://localhost:5000/applications/a1/approve"
        );
    }

    #[test]
    fn employer_registration_uses_backend_field_names() {
        let reg = EmployerRegistration {
            company_name: "TechNova Solutions".into(),
            email: "hr@technova.com".into(),
            industry: "Information Technology".into(),
            job_openings: "12".into(),
            password: "secret".into(),
        };
        let json = serde_json::to_value(&reg).unwrap();
        assert_eq!(json["companyName"], "TechNova Solutions");
        assert_eq!(json["jobOpenings"], "12");
    }

    #[test]
    fn new_job_serializes_type_field() {
        let job = NewJob {
            title: "Frontend Developer".into(),
            department: "Engineering".into(),
            description: "Build web applications".into(),
            location: "Kampala, Uganda".into(),
            job_type: "Full-time".into(),
            experience_required: "3+ years".into(),
            salary_min: Some(800),
            salary_max: Some(1500),
            skills_required: "React, TypeScript".into(),
        };
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["type"], "Full-time");
        assert_eq!(json["salary_min"], 800);
    }
}
