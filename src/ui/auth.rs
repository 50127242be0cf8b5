//! Simulated sign-in. Profiles are stored locally and no credential is
//! ever checked.

use super::Notifier;
use crate::platform::{DynStore, StorageError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_USER_KEY: &str = "gallery_user";
const PLACEHOLDER_AVATAR: &str = "https://via.placeholder.com/40";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Passwords do not match!")]
    PasswordMismatch,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    #[default]
    Login,
    Signup,
}

impl AuthMode {
    pub fn other(self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Signup,
            AuthMode::Signup => AuthMode::Login,
        }
    }

    pub fn modal(self) -> AuthModal {
        match self {
            AuthMode::Login => AuthModal {
                mode: self,
                title: "Login",
                submit_label: "Login",
                show_confirm: false,
                switch_text: "Don't have an account?",
                switch_label: "Sign up",
                switch_mode: self.other(),
            },
            AuthMode::Signup => AuthModal {
                mode: self,
                title: "Sign Up",
                submit_label: "Sign Up",
                show_confirm: true,
                switch_text: "Already have an account?",
                switch_label: "Login",
                switch_mode: self.other(),
            },
        }
    }
}

/// Labels of the login/signup dialog for one mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthModal {
    pub mode: AuthMode,
    pub title: &'static str,
    pub submit_label: &'static str,
    pub show_confirm: bool,
    pub switch_text: &'static str,
    pub switch_label: &'static str,
    pub switch_mode: AuthMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginMethod {
    Google,
    Email,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub login_method: LoginMethod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthForm {
    #[serde(default)]
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub confirm_password: Option<String>,
}

#[derive(Clone)]
pub struct AuthService {
    store: DynStore,
    key: String,
    notifier: Notifier,
}

impl AuthService {
    pub fn new(store: DynStore, key: impl Into<String>, notifier: Notifier) -> Self {
        Self {
            store,
            key: key.into(),
            notifier,
        }
    }

    pub async fn current_user(&self) -> Option<UserProfile> {
        let stored = match self.store.get_item(&self.key).await {
            Ok(stored) => stored?,
            Err(e) => {
                warn!("Could not read stored user: {}", e);
                return None;
            }
        };
        match serde_json::from_str(&stored) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!("Ignoring unreadable stored user: {}", e);
                None
            }
        }
    }

    pub async fn login_with_google(&self) -> Result<UserProfile, AuthError> {
        let profile = UserProfile {
            name: "Google User".to_string(),
            email: "user@gmail.com".to_string(),
            avatar: PLACEHOLDER_AVATAR.to_string(),
            login_method: LoginMethod::Google,
        };
        self.persist(&profile).await?;
        self.notifier
            .success("Successfully logged in with Google!")
            .await;
        Ok(profile)
    }

    pub async fn submit(&self, form: &AuthForm) -> Result<UserProfile, AuthError> {
        if form.mode == AuthMode::Signup
            && form.confirm_password.as_deref().unwrap_or_default() != form.password
        {
            self.notifier
                .error(AuthError::PasswordMismatch.to_string())
                .await;
            return Err(AuthError::PasswordMismatch);
        }

        let name = form.email.split('@').next().unwrap_or_default();
        let profile = UserProfile {
            name: name.to_string(),
            email: form.email.clone(),
            avatar: PLACEHOLDER_AVATAR.to_string(),
            login_method: LoginMethod::Email,
        };
        self.persist(&profile).await?;

        let action = match form.mode {
            AuthMode::Login => "logged in",
            AuthMode::Signup => "signed up",
        };
        self.notifier
            .success(format!("Successfully {}!", action))
            .await;
        Ok(profile)
    }

    pub async fn logout(&self) -> Result<(), AuthError> {
        self.store.remove_item(&self.key).await?;
        info!("User logged out");
        self.notifier.success("Successfully logged out!").await;
        Ok(())
    }

    async fn persist(&self, profile: &UserProfile) -> Result<(), AuthError> {
        let json = serde_json::to_string(profile)?;
        self.store.set_item(&self.key, json).await?;
        info!(email = %profile.email, "User signed in");
        Ok(())
    }
}
