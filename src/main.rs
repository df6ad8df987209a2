mod api;
mod apply;
mod cache;
mod error;
mod fetcher;
mod models;
mod session;
mod tui;

use std::path::PathBuf;
use std::sync::OnceLock;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use regex::Regex;
use tracing_subscriber::EnvFilter;

use api::{ApiClient, CandidateRegistration, EmployerRegistration, NewJob, DEFAULT_BASE_URL};
use error::ValidationError;
use models::{Role, Session};
use session::SessionStore;

#[derive(Parser)]
#[command(name = "joblink")]
#[command(about = "JobLink job board client - browse jobs, apply, and review applications")]
struct Cli {
    /// Base URL of the JobLink backend
    #[arg(long, global = true, env = "JOBLINK_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },

    /// Clear the persisted session
    Logout,

    /// Show the current session
    Whoami,

    /// Register an account
    Register {
        #[command(subcommand)]
        command: RegisterCommands,
    },

    /// List open jobs
    Jobs,

    /// Post a new job (employer)
    PostJob {
        /// Job title
        title: String,

        /// Department the role belongs to
        #[arg(short, long, default_value = "")]
        department: String,

        /// Job description
        #[arg(long, default_value = "")]
        description: String,

        /// Location
        #[arg(short, long, default_value = "")]
        location: String,

        /// Employment type (Full-time, Part-time, Contract)
        #[arg(short = 't', long, default_value = "Full-time")]
        job_type: String,

        /// Required experience (e.g. "3+ years")
        #[arg(long, default_value = "")]
        experience_required: String,

        /// Salary range lower bound
        #[arg(long)]
        salary_min: Option<i64>,

        /// Salary range upper bound
        #[arg(long)]
        salary_max: Option<i64>,

        /// Comma-separated required skills
        #[arg(short, long, default_value = "")]
        skills_required: String,
    },

    /// List applications (candidates see their own, employers/admins see all)
    Applications,

    /// Approve an application (employer/admin)
    Approve {
        /// Application ID
        id: String,
    },

    /// Reject an application (employer/admin)
    Reject {
        /// Application ID
        id: String,
    },

    /// Open the role-appropriate interactive dashboard
    Dashboard,
}

#[derive(Subcommand)]
enum RegisterCommands {
    /// Register as a job seeker
    Candidate {
        /// Full name
        #[arg(short, long)]
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Comma-separated skills
        #[arg(short, long, default_value = "")]
        skills: String,

        /// Work experience summary
        #[arg(long, default_value = "")]
        experience: String,

        /// Education summary
        #[arg(long, default_value = "")]
        education: String,

        /// Portfolio URL
        #[arg(long, default_value = "")]
        portfolio: String,

        /// Account password
        #[arg(short, long)]
        password: String,

        /// Repeat the password
        #[arg(long)]
        confirm_password: Option<String>,

        /// Path to a resume file to upload
        #[arg(long)]
        resume: Option<PathBuf>,
    },

    /// Register as an employer
    Employer {
        /// Company name
        #[arg(short, long)]
        company_name: String,

        /// Contact email
        #[arg(short, long)]
        email: String,

        /// Industry
        #[arg(short, long, default_value = "")]
        industry: String,

        /// Current number of open positions
        #[arg(short, long, default_value = "0")]
        job_openings: String,

        /// Account password
        #[arg(short, long)]
        password: String,

        /// Repeat the password
        #[arg(long)]
        confirm_password: Option<String>,
    },
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern"))
}

fn validate_email(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    if !email_regex().is_match(value) {
        return Err(ValidationError::BadEmail(field));
    }
    Ok(())
}

fn validate_password(
    password: &str,
    confirm: Option<&str>,
) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::MissingField("password"));
    }
    if let Some(confirm) = confirm {
        if confirm != password {
            return Err(ValidationError::PasswordMismatch);
        }
    }
    Ok(())
}

fn require_session(store: &SessionStore) -> Result<Session> {
    store
        .current()
        .ok_or_else(|| anyhow!("Not logged in. Run 'joblink login' first."))
}

fn require_role(store: &SessionStore, allowed: &[Role]) -> Result<Session> {
    let session = require_session(store)?;
    if !allowed.contains(&session.role) {
        return Err(anyhow!(
            "This command needs one of the roles {:?}; you are logged in as {}",
            allowed.iter().map(|r| r.as_str()).collect::<Vec<_>>(),
            session.role.as_str()
        ));
    }
    Ok(session)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = SessionStore::open()?;

    match cli.command {
        Commands::Login { email, password } => {
            validate_email("email", &email)?;
            let api = ApiClient::new(&cli.api_url)?;
            let session = store.login(&api, &email, &password)?;
            println!(
                "Logged in as {} ({})",
                session.email,
                session.role.display_name()
            );
        }

        Commands::Logout => {
            store.logout()?;
            println!("Logged out.");
        }

        Commands::Whoami => match store.current() {
            Some(session) => println!(
                "{} ({})",
                session.email,
                session.role.display_name()
            ),
            None => println!("Not logged in."),
        },

        Commands::Register { command } => match command {
            RegisterCommands::Candidate {
                name,
                email,
                skills,
                experience,
                education,
                portfolio,
                password,
                confirm_password,
                resume,
            } => {
                if name.trim().is_empty() {
                    return Err(ValidationError::MissingField("name").into());
                }
                validate_email("email", &email)?;
                validate_password(&password, confirm_password.as_deref())?;

                let api = ApiClient::new(&cli.api_url)?;
                api.register_candidate(&CandidateRegistration {
                    name,
                    email: email.clone(),
                    skills,
                    experience,
                    education,
                    portfolio,
                    password,
                    resume,
                })?;
                println!("Registered candidate {}. You can now log in.", email);
            }

            RegisterCommands::Employer {
                company_name,
                email,
                industry,
                job_openings,
                password,
                confirm_password,
            } => {
                if company_name.trim().is_empty() {
                    return Err(ValidationError::MissingField("company name").into());
                }
                validate_email("email", &email)?;
                validate_password(&password, confirm_password.as_deref())?;

                let api = ApiClient::new(&cli.api_url)?;
                api.register_employer(&EmployerRegistration {
                    company_name: company_name.clone(),
                    email,
                    industry,
                    job_openings,
                    password,
                })?;
                println!("Registered employer {}. You can now log in.", company_name);
            }
        },

        Commands::Jobs => {
            let api = ApiClient::new(&cli.api_url)?;
            let jobs = api.list_jobs()?;
            if jobs.is_empty() {
                println!("No jobs available at the moment.");
            } else {
                println!(
                    "{:<10} {:<30} {:<20} {:<16} {:>16}",
                    "ID", "TITLE", "COMPANY", "LOCATION", "SALARY"
                );
                println!("{}", "-".repeat(96));
                for job in jobs {
                    let hot = if job.hot { " (hot)" } else { "" };
                    println!(
                        "{:<10} {:<30} {:<20} {:<16} {:>16}",
                        truncate(&job.id, 8),
                        format!("{}{}", truncate(&job.title, 28 - hot.len()), hot),
                        truncate(job.company_name.as_deref().unwrap_or("-"), 18),
                        truncate(job.location.as_deref().unwrap_or("-"), 14),
                        job.salary_display(),
                    );
                }
            }
        }

        Commands::PostJob {
            title,
            department,
            description,
            location,
            job_type,
            experience_required,
            salary_min,
            salary_max,
            skills_required,
        } => {
            require_role(&store, &[Role::Employer])?;
            if title.trim().is_empty() {
                return Err(ValidationError::MissingField("title").into());
            }
            let api = ApiClient::new(&cli.api_url)?;
            api.create_job(&NewJob {
                title: title.clone(),
                department,
                description,
                location,
                job_type,
                experience_required,
                salary_min,
                salary_max,
                skills_required,
            })?;
            println!("Posted job '{}'.", title);
        }

        Commands::Applications => {
            let session = require_session(&store)?;
            let api = ApiClient::new(&cli.api_url)?;
            let applications = match session.role {
                Role::Candidate => {
                    let profile = api.find_profile(&session.email)?;
                    match profile {
                        Some(p) => api
                            .list_applications()?
                            .into_iter()
                            .filter(|a| a.candidate_id == p.id)
                            .collect(),
                        None => Vec::new(),
                    }
                }
                Role::Employer | Role::Admin => api.list_applications()?,
            };

            if applications.is_empty() {
                println!("No applications found.");
            } else {
                println!(
                    "{:<10} {:<12} {:<10} {:<14}",
                    "ID", "CANDIDATE", "JOB", "STATUS"
                );
                println!("{}", "-".repeat(48));
                for app in applications {
                    println!(
                        "{:<10} {:<12} {:<10} {:<14}",
                        truncate(&app.id, 8),
                        truncate(&app.candidate_id, 10),
                        truncate(&app.job_id, 8),
                        app.status.as_str(),
                    );
                }
            }
        }

        Commands::Approve { id } => {
            require_role(&store, &[Role::Employer, Role::Admin])?;
            let api = ApiClient::new(&cli.api_url)?;
            api.approve_application(&id)?;
            println!("Application {} approved.", id);
        }

        Commands::Reject { id } => {
            require_role(&store, &[Role::Employer, Role::Admin])?;
            let api = ApiClient::new(&cli.api_url)?;
            api.reject_application(&id)?;
            println!("Application {} rejected.", id);
        }

        Commands::Dashboard => {
            // The role router: the stored role alone decides which
            // dashboard opens.
            let session = require_session(&store)?;
            tui::run_dashboard(session, &cli.api_url)?;
        }
    }

    Ok(())
}

// Cuts on char boundaries; titles and names are not always ASCII.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(validate_email("email", "sarah@example.com").is_ok());
        assert!(matches!(
            validate_email("email", ""),
            Err(ValidationError::MissingField("email"))
        ));
        assert!(matches!(
            validate_email("email", "not-an-email"),
            Err(ValidationError::BadEmail("email"))
        ));
        assert!(matches!(
            validate_email("email", "two words@example.com"),
            Err(ValidationError::BadEmail("email"))
        ));
    }

    #[test]
    fn password_validation() {
        assert!(validate_password("secret", None).is_ok());
        assert!(validate_password("secret", Some("secret")).is_ok());
        assert!(matches!(
            validate_password("", None),
            Err(ValidationError::MissingField("password"))
        ));
        assert!(matches!(
            validate_password("secret", Some("other")),
            Err(ValidationError::PasswordMismatch)
        ));
    }

    #[test]
    fn truncate_limits_width() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer title", 10), "a much ...");
    }

    #[test]
    fn truncate_handles_multibyte_titles() {
        assert_eq!(truncate("Développeur Front-End", 5), "Dé...");
        assert_eq!(truncate("Développeur", 11), "Développeur");
    }
}
