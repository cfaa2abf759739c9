//! Password hashing and account registration/login.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use intelplat_core::{Database, NewUser, User};

/// Outcome of a register or login attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthOutcome {
    /// New account created with this id
    Registered(i64),
    UsernameTaken,
    LoggedIn(User),
    UnknownUser,
    WrongPassword,
}

impl AuthOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Registered(_) | AuthOutcome::LoggedIn(_))
    }

    /// One-line message for the given username
    pub fn message(&self, username: &str) -> String {
        match self {
            AuthOutcome::Registered(_) => format!("User '{username}' registered successfully"),
            AuthOutcome::UsernameTaken => format!("Username '{username}' already exists"),
            AuthOutcome::LoggedIn(user) => match user.role.as_deref() {
                Some(role) => format!("Welcome, {username}! (role: {role})"),
                None => format!("Welcome, {username}!"),
            },
            AuthOutcome::UnknownUser => format!("User '{username}' not found"),
            AuthOutcome::WrongPassword => "Invalid password".to_string(),
        }
    }
}

/// Hash a password with Argon2id and a random salt, in PHC string format.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("hash password: {e}"))?;
    Ok(hash.to_string())
}

/// Check a password against a stored PHC hash.
///
/// Verification uses the parameters embedded in the hash. A hash that
/// does not parse is an error; a mismatch is `Ok(false)`.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow!("parse password hash: {e}"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Create an account unless the username is taken.
pub fn register_user(db: &Database, username: &str, password: &str, role: &str) -> Result<AuthOutcome> {
    if db.find_user_by_username(username)?.is_some() {
        return Ok(AuthOutcome::UsernameTaken);
    }

    let user = NewUser::new(username, hash_password(password)?).with_role(role);
    match db.insert_user(&user) {
        Ok(id) => Ok(AuthOutcome::Registered(id)),
        Err(e) if e.is_constraint_violation() => Ok(AuthOutcome::UsernameTaken),
        Err(e) => Err(e.into()),
    }
}

/// Check credentials for an existing account.
pub fn login_user(db: &Database, username: &str, password: &str) -> Result<AuthOutcome> {
    let Some(user) = db.find_user_by_username(username)? else {
        return Ok(AuthOutcome::UnknownUser);
    };

    if verify_password(password, &user.password_hash)? {
        tracing::info!(username, "User logged in");
        Ok(AuthOutcome::LoggedIn(user))
    } else {
        tracing::warn!(username, "Rejected login");
        Ok(AuthOutcome::WrongPassword)
    }
}
