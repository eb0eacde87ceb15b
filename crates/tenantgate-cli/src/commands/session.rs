//! Session management CLI commands.

use std::collections::BTreeSet;
use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::debug;

use crate::output::{self, OutputFormat};
use tenantgate_auth::claims::{decode_token_payload, normalize_claims, token_expiry};
use tenantgate_auth::{SessionManager, SessionState};
use tenantgate_client::HttpAuthApi;
use tenantgate_core::config::AppConfig;
use tenantgate_core::error::AppError;
use tenantgate_core::types::{LoginRequest, Tier, UserClaims};
use tenantgate_store::StoreManager;

/// Arguments for session commands
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session subcommand
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Session subcommands
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Show the persisted session
    Status,
    /// Show the normalized claims carried by a token
    Decode {
        /// Compact `header.payload.signature` token
        token: String,
    },
    /// Sign in against the configured API and persist the session
    Login {
        /// Account email
        #[arg(long)]
        email: String,
        /// Account password
        #[arg(long, env = "TENANTGATE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Refresh the persisted session's access token
    Refresh,
    /// Sign out and clear the persisted session
    Logout,
}

/// Session display
#[derive(Debug, Serialize)]
struct SessionReport {
    state: SessionState,
    user_id: Option<String>,
    username: Option<String>,
    email: Option<String>,
    tier: Option<Tier>,
    company_id: Option<String>,
    roles: BTreeSet<String>,
    permissions: BTreeSet<String>,
    expires_at: Option<String>,
    expiring_soon: bool,
}

impl SessionReport {
    fn new(manager: &SessionManager) -> Self {
        let session = manager.current();
        let expires_at = session.as_ref().and_then(|s| s.expires_at);
        let claims = session.as_ref().map(|s| s.claims.clone());

        let mut report = Self::from_claims(manager.state(), claims);
        report.expires_at = expires_at.map(|e| e.to_rfc3339());
        report.expiring_soon = expires_at.is_some_and(|e| manager.is_expiring_soon(e));
        report
    }

    fn from_claims(state: SessionState, claims: Option<UserClaims>) -> Self {
        match claims {
            Some(claims) => Self {
                state,
                user_id: Some(claims.user_id),
                username: Some(claims.username).filter(|s| !s.is_empty()),
                email: Some(claims.email).filter(|s| !s.is_empty()),
                tier: Some(claims.tier),
                company_id: claims.company_id,
                roles: claims.roles,
                permissions: claims.permissions,
                expires_at: None,
                expiring_soon: false,
            },
            None => Self {
                state,
                user_id: None,
                username: None,
                email: None,
                tier: None,
                company_id: None,
                roles: BTreeSet::new(),
                permissions: BTreeSet::new(),
                expires_at: None,
                expiring_soon: false,
            },
        }
    }
}

/// Execute session commands
pub async fn execute(
    args: &SessionArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        SessionCommand::Decode { token } => {
            let payload = decode_token_payload(token)
                .ok_or_else(|| AppError::validation("Token payload could not be decoded"))?;
            let claims = normalize_claims(&payload);
            if claims.is_none() {
                output::print_warning("Token payload carries no user identifier");
            }
            let mut report = SessionReport::from_claims(SessionState::SignedOut, claims);
            report.expires_at = token_expiry(token).map(|e| e.to_rfc3339());
            output::print_item(&report, format);
        }
        SessionCommand::Status => {
            let manager = build_manager(config)?;
            manager.hydrate();
            output::print_item(&SessionReport::new(&manager), format);
        }
        SessionCommand::Login { email, password } => {
            let manager = build_manager(config)?;
            let credentials = LoginRequest {
                email: email.clone(),
                password: password.clone(),
            };
            let session = manager.login(&credentials).await?;
            output::print_success(&format!("Signed in as {}", session.claims.user_id));
            output::print_item(&SessionReport::new(&manager), format);
        }
        SessionCommand::Refresh => {
            let manager = build_manager(config)?;
            if manager.hydrate() != SessionState::Active {
                output::print_warning("No persisted session to refresh");
                return Ok(());
            }
            manager.refresh().await?;
            output::print_success("Access token refreshed");
            output::print_item(&SessionReport::new(&manager), format);
        }
        SessionCommand::Logout => {
            let manager = build_manager(config)?;
            manager.hydrate();
            let redirect = manager.logout().await;
            output::print_success(&format!("Signed out (redirect: {redirect})"));
        }
    }

    Ok(())
}

/// Helper: session manager over the configured store and API
fn build_manager(config: &AppConfig) -> Result<SessionManager, AppError> {
    debug!(store = %config.session.store, api = %config.api.base_url, "Building session manager");
    let store = StoreManager::new(&config.session)?;
    let api = HttpAuthApi::new(config.api.clone())?;
    Ok(SessionManager::new(
        store.store(),
        Arc::new(api),
        config.session.clone(),
    ))
}
