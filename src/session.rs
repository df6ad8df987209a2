use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::error::AuthError;
use crate::models::{Role, Session};

/// On-disk shape of the session file. Key names match what the original
/// client kept in browser-local storage.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    #[serde(rename = "userEmail")]
    user_email: String,
    #[serde(rename = "userRole")]
    user_role: String,
}

/// File-backed session store. Survives process restarts; cleared only by
/// an explicit logout.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn open() -> Result<Self> {
        Ok(Self {
            path: Self::default_path()?,
        })
    }

    #[cfg(test)]
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    fn default_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "joblink") {
            Ok(proj_dirs.data_dir().join("session.json"))
        } else {
            Ok(PathBuf::from("joblink-session.json"))
        }
    }

    /// The current session, or None when there is no file or its role is
    /// not one of the known roles.
    pub fn current(&self) -> Option<Session> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let stored: StoredSession = serde_json::from_str(&raw).ok()?;
        let role = Role::parse(&stored.user_role)?;
        Some(Session {
            email: stored.user_email,
            role,
        })
    }

    pub fn login(
        &self,
        api: &ApiClient,
        email: &str,
        password: &str,
    ) -> std::result::Result<Session, AuthError> {
        let response = api.login(email, password)?;
        if !response.success {
            return Err(AuthError::InvalidCredentials);
        }
        let role_str = response.role.unwrap_or_default();
        let role = Role::parse(&role_str).ok_or(AuthError::UnknownRole(role_str))?;

        let session = Session {
            email: email.to_string(),
            role,
        };
        if let Err(e) = self.persist(&session) {
            tracing::warn!("could not persist session: {e:#}");
        }
        Ok(session)
    }

    fn persist(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let stored = StoredSession {
            user_email: session.email.clone(),
            user_role: session.role.as_str().to_string(),
        };
        let raw = serde_json::to_string_pretty(&stored)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write session file {}", self.path.display()))
    }

    pub fn logout(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| {
                format!("failed to remove session file {}", self.path.display())
            }),
        }
    }

    #[cfg(test)]
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::at(dir.path().join("session.json"))
    }

    #[test]
    fn no_file_means_no_session() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).current().is_none());
    }

    #[test]
    fn persisted_session_round_trips_with_storage_key_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .persist(&Session {
                email: "hr@technova.com".into(),
                role: Role::Employer,
            })
            .unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("userEmail"));
        assert!(raw.contains("userRole"));

        let session = store.current().unwrap();
        assert_eq!(session.email, "hr@technova.com");
        assert_eq!(session.role, Role::Employer);
    }

    #[test]
    fn unrecognized_role_is_unauthenticated() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"{"userEmail":"x@y.com","userRole":"superuser"}"#,
        )
        .unwrap();
        assert!(store.current().is_none());
    }

    #[test]
    fn logout_clears_persisted_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .persist(&Session {
                email: "a@b.com".into(),
                role: Role::Candidate,
            })
            .unwrap();
        assert!(store.current().is_some());

        store.logout().unwrap();
        assert!(store.current().is_none());
        assert!(!store.path().exists());

        // Logging out twice is fine.
        store.logout().unwrap();
    }
}
