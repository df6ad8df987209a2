use crate::api::{NewApplication, RefereeNotification};
use crate::models::{Job, Profile};

/// Fields the apply modal edits. Pre-filled on open, freely editable, and
/// kept around across a failed submit so the user can retry.
#[derive(Debug, Clone)]
pub struct ApplyForm {
    pub job_id: String,
    pub job_title: String,
    pub company_name: String,
    pub cover_letter: String,
    pub referee1_name: String,
    pub referee1_email: String,
    pub referee2_name: String,
    pub referee2_email: String,
    pub error: Option<String>,
}

/// Apply workflow: Closed -> Drafting -> Submitting -> Closed on success,
/// back to Drafting with the error shown on failure.
#[derive(Debug, Clone)]
pub enum ApplyFlow {
    Closed,
    Drafting(ApplyForm),
    Submitting(ApplyForm),
}

impl ApplyFlow {
    pub fn new() -> Self {
        ApplyFlow::Closed
    }

    /// Open the modal for a job with the cover letter pre-filled from the
    /// profile. Callers guard with `is_applied` before calling.
    pub fn open(&mut self, job: &Job, profile: Option<&Profile>) {
        *self = ApplyFlow::Drafting(ApplyForm {
            job_id: job.id.clone(),
            job_title: job.title.clone(),
            company_name: job
                .company_name
                .clone()
                .unwrap_or_else(|| "your company".to_string()),
            cover_letter: cover_letter_template(job, profile),
            referee1_name: String::new(),
            referee1_email: String::new(),
            referee2_name: String::new(),
            referee2_email: String::new(),
            error: None,
        });
    }

    pub fn close(&mut self) {
        *self = ApplyFlow::Closed;
    }

    pub fn form(&self) -> Option<&ApplyForm> {
        match self {
            ApplyFlow::Drafting(form) | ApplyFlow::Submitting(form) => Some(form),
            ApplyFlow::Closed => None,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut ApplyForm> {
        match self {
            ApplyFlow::Drafting(form) => Some(form),
            // No edits while a submit is in flight.
            ApplyFlow::Submitting(_) | ApplyFlow::Closed => None,
        }
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, ApplyFlow::Submitting(_))
    }

    /// True when a submit for this job is already in flight.
    pub fn in_flight_for(&self, job_id: &str) -> bool {
        matches!(self, ApplyFlow::Submitting(form) if form.job_id == job_id)
    }

    /// Move Drafting -> Submitting and hand back the request payloads.
    /// Returns None when there is nothing to submit or one is already in
    /// flight. An empty cover letter is allowed.
    pub fn begin_submit(
        &mut self,
        profile: &Profile,
    ) -> Option<(NewApplication, RefereeNotification)> {
        let ApplyFlow::Drafting(form) = self else {
            return None;
        };
        let payload = NewApplication {
            email: profile.email.clone(),
            job_id: form.job_id.clone(),
            cover_letter: form.cover_letter.clone(),
            referee1_name: form.referee1_name.clone(),
            referee1_email: form.referee1_email.clone(),
            referee2_name: form.referee2_name.clone(),
            referee2_email: form.referee2_email.clone(),
        };
        let notify = RefereeNotification {
            applicant_name: profile.name.clone(),
            referees: vec![form.referee1_email.clone(), form.referee2_email.clone()],
        };
        let mut form = form.clone();
        form.error = None;
        *self = ApplyFlow::Submitting(form);
        Some((payload, notify))
    }

    /// Submit succeeded; the modal closes and drafted state is discarded.
    pub fn submitted(&mut self) {
        *self = ApplyFlow::Closed;
    }

    /// Submit failed; keep the draft open with the error shown so the user
    /// can edit and retry.
    pub fn submit_failed(&mut self, message: impl Into<String>) {
        if let ApplyFlow::Submitting(form) = self {
            let mut form = form.clone();
            form.error = Some(message.into());
            *self = ApplyFlow::Drafting(form);
        }
    }
}

impl Default for ApplyFlow {
    fn default() -> Self {
        Self::new()
    }
}

/// The fixed cover-letter template. Deterministic for a given job and
/// profile; the user edits the result freely before submitting.
pub fn cover_letter_template(job: &Job, profile: Option<&Profile>) -> String {
    let company = job.company_name.as_deref().unwrap_or("your company");
    let (experience, skills, name, email) = match profile {
        Some(p) => {
            let skills = p.skill_list().join(", ");
            (
                p.experience
                    .clone()
                    .filter(|e| !e.is_empty())
                    .unwrap_or_else(|| "relevant fields".to_string()),
                if skills.is_empty() {
                    "various technologies".to_string()
                } else {
                    skills
                },
                p.name.clone(),
                p.email.clone(),
            )
        }
        None => (
            "relevant fields".to_string(),
            "various technologies".to_string(),
            String::new(),
            String::new(),
        ),
    };

    format!(
        "Dear Hiring Manager,\n\n\
         I am excited to apply for the position of {title} at {company}.\n\n\
         With my experience in {experience} and skills in {skills}, I am confident \
         I can contribute positively to your team.\n\n\
         Thank you for considering my application.\n\n\
         Sincerely,\n\
         {name}\n\
         Email: {email}",
        title = job.title,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> Job {
        serde_json::from_str(
            r#"{"id":"J1","title":"Frontend Developer","company_name":"TechNova"}"#,
        )
        .unwrap()
    }

    fn profile() -> Profile {
        Profile {
            id: "c1".into(),
            name: "Sarah Okello".into(),
            email: "sarah@example.com".into(),
            skills: Some("React, TypeScript".into()),
            experience: Some("frontend engineering".into()),
            education: None,
            portfolio: None,
        }
    }

    #[test]
    fn template_embeds_job_and_profile_fields() {
        let letter = cover_letter_template(&job(), Some(&profile()));
        assert!(letter.contains("Frontend Developer"));
        assert!(letter.contains("TechNova"));
        assert!(letter.contains("frontend engineering"));
        assert!(letter.contains("React, TypeScript"));
        assert!(letter.contains("Sarah Okello"));
        assert!(letter.contains("sarah@example.com"));
        // Deterministic.
        assert_eq!(letter, cover_letter_template(&job(), Some(&profile())));
    }

    #[test]
    fn template_falls_back_without_profile_details() {
        let mut p = profile();
        p.skills = None;
        p.experience = None;
        let letter = cover_letter_template(&job(), Some(&p));
        assert!(letter.contains("relevant fields"));
        assert!(letter.contains("various technologies"));
    }

    #[test]
    fn open_prefills_and_submit_transitions() {
        let mut flow = ApplyFlow::new();
        assert!(flow.form().is_none());

        flow.open(&job(), Some(&profile()));
        let form = flow.form().unwrap();
        assert_eq!(form.job_id, "J1");
        assert!(form.cover_letter.contains("Frontend Developer"));

        let (payload, notify) = flow.begin_submit(&profile()).unwrap();
        assert_eq!(payload.email, "sarah@example.com");
        assert_eq!(payload.job_id, "J1");
        assert_eq!(notify.applicant_name, "Sarah Okello");
        assert!(flow.is_submitting());
        assert!(flow.in_flight_for("J1"));
        assert!(!flow.in_flight_for("J2"));

        flow.submitted();
        assert!(matches!(flow, ApplyFlow::Closed));
    }

    #[test]
    fn second_submit_while_in_flight_is_rejected() {
        let mut flow = ApplyFlow::new();
        flow.open(&job(), Some(&profile()));
        assert!(flow.begin_submit(&profile()).is_some());
        // Already submitting; another attempt must be refused.
        assert!(flow.begin_submit(&profile()).is_none());
        // And the form is not editable while in flight.
        assert!(flow.form_mut().is_none());
    }

    #[test]
    fn empty_cover_letter_is_allowed() {
        let mut flow = ApplyFlow::new();
        flow.open(&job(), Some(&profile()));
        flow.form_mut().unwrap().cover_letter.clear();
        let (payload, _) = flow.begin_submit(&profile()).unwrap();
        assert_eq!(payload.cover_letter, "");
    }

    #[test]
    fn failure_returns_to_drafting_with_error_and_allows_retry() {
        let mut flow = ApplyFlow::new();
        flow.open(&job(), Some(&profile()));
        flow.begin_submit(&profile()).unwrap();

        flow.submit_failed("500: server error");
        let form = flow.form().unwrap();
        assert_eq!(form.error.as_deref(), Some("500: server error"));
        assert!(!flow.is_submitting());

        // Retry clears the error on its way out.
        flow.begin_submit(&profile()).unwrap();
        assert!(flow.is_submitting());
        if let ApplyFlow::Submitting(form) = &flow {
            assert!(form.error.is_none());
        }
    }
}
