use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::auth::{PasswordHasher, TokenService};
use super::authorization::{can_administer, can_toggle_block};
use super::domain::{Actor, Role, User, UserId, UserProfile};
use super::error::PortalError;
use super::store::RepositoryError;
use super::store::UserRepository;
use super::validation;

/// Sign-up payload. `role` defaults to jobseeker when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Token handed back on sign-up and sign-in. Callers present it as a bearer header.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

/// Account registration, sign-in, and administration.
pub struct UserService<S> {
    store: Arc<S>,
    hasher: PasswordHasher,
    tokens: TokenService,
}

impl<S> UserService<S>
where
    S: UserRepository + 'static,
{
    pub fn new(store: Arc<S>, hasher: PasswordHasher, tokens: TokenService) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    pub fn register(&self, registration: Registration) -> Result<Session, PortalError> {
        let name = validation::name(&registration.name)?;
        let email = validation::email(&registration.email)?;
        validation::password(&registration.password)?;
        let role = match registration.role.as_deref() {
            None => Role::JobSeeker,
            Some(raw) => Role::parse(raw).ok_or_else(|| {
                PortalError::invalid_input("role must be one of jobseeker, recruiter, admin")
            })?,
        };

        if self.store.find_user_by_email(&email)?.is_some() {
            return Err(email_registered());
        }

        let now = Utc::now();
        let user = User {
            id: UserId::generate(),
            name,
            email,
            password_hash: self.hasher.hash(&registration.password)?,
            role,
            is_blocked: false,
            created_at: now,
            updated_at: now,
        };
        let stored = match self.store.insert_user(user) {
            Ok(stored) => stored,
            Err(RepositoryError::Conflict(_)) => return Err(email_registered()),
            Err(err) => return Err(err.into()),
        };
        tracing::info!(user_id = %stored.id, role = %stored.role, "account registered");

        self.session_for(&stored)
    }

    pub fn login(&self, request: LoginRequest) -> Result<Session, PortalError> {
        let email = request.email.trim().to_lowercase();
        let user = self
            .store
            .find_user_by_email(&email)?
            .filter(|user| self.hasher.verify(&request.password, &user.password_hash))
            .ok_or_else(|| PortalError::unauthorized("invalid credentials"))?;

        if user.is_blocked {
            tracing::warn!(user_id = %user.id, "blocked account attempted to sign in");
            return Err(PortalError::unauthorized("account is blocked"));
        }

        self.session_for(&user)
    }

    /// Resolve a bearer token into the acting account.
    pub fn authenticate(&self, token: &str) -> Result<Actor, PortalError> {
        let claims = self.tokens.verify(token)?;
        let user = self
            .store
            .fetch_user(&claims.user_id())?
            .ok_or_else(|| PortalError::unauthorized("account no longer exists"))?;

        if user.is_blocked {
            return Err(PortalError::unauthorized("account is blocked"));
        }
        Ok(user.actor())
    }

    pub fn me(&self, actor: &Actor) -> Result<UserProfile, PortalError> {
        Ok(self.load(&actor.id)?.profile())
    }

    pub fn update_profile(
        &self,
        actor: &Actor,
        update: ProfileUpdate,
    ) -> Result<UserProfile, PortalError> {
        let mut user = self.load(&actor.id)?;

        if let Some(name) = update.name.as_deref() {
            user.name = validation::name(name)?;
        }
        if let Some(email) = update.email.as_deref() {
            let email = validation::email(email)?;
            if let Some(holder) = self.store.find_user_by_email(&email)? {
                if holder.id != user.id {
                    return Err(email_in_use());
                }
            }
            user.email = email;
        }
        user.updated_at = Utc::now();

        match self.store.update_user(user) {
            Ok(stored) => Ok(stored.profile()),
            Err(RepositoryError::Conflict(_)) => Err(email_in_use()),
            Err(err) => Err(err.into()),
        }
    }

    pub fn list_users(&self, actor: &Actor) -> Result<Vec<UserProfile>, PortalError> {
        can_administer(actor).into_result()?;
        Ok(self
            .store
            .list_users()?
            .iter()
            .map(User::profile)
            .collect())
    }

    /// Flip the blocked flag on another account.
    pub fn toggle_block(&self, actor: &Actor, target: &UserId) -> Result<UserProfile, PortalError> {
        can_administer(actor).into_result()?;
        let mut user = self.load(target)?;
        can_toggle_block(actor, &user).into_result()?;

        user.is_blocked = !user.is_blocked;
        user.updated_at = Utc::now();
        let stored = self.store.update_user(user)?;
        tracing::info!(
            user_id = %stored.id,
            blocked = stored.is_blocked,
            admin = %actor.id,
            "account block toggled"
        );

        Ok(stored.profile())
    }

    fn load(&self, id: &UserId) -> Result<User, PortalError> {
        self.store
            .fetch_user(id)?
            .ok_or(PortalError::NotFound("user"))
    }

    fn session_for(&self, user: &User) -> Result<Session, PortalError> {
        Ok(Session {
            token: self.tokens.issue(user)?,
            user: user.profile(),
        })
    }
}

fn email_registered() -> PortalError {
    PortalError::Conflict("an account with this email already exists".to_string())
}

fn email_in_use() -> PortalError {
    PortalError::Conflict("email is already in use".to_string())
}
