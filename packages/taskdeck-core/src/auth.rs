/// Local accounts and the signed-in session.
///
/// Users live in one JSON array under `users`; the signed-in user is copied
/// under `user`. Emails are unique, compared trimmed and case-insensitively.
/// Passwords are kept as hex SHA-256 of `"<user id>:<password>"`.
///
/// Rejections (duplicate email, wrong password) are `Ok(None)`, never errors.
use std::sync::Arc;

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::ids;
use crate::storage::{KeyValueStore, StorageError};
use crate::store::BoardStore;
use crate::types::User;

pub const USERS_KEY: &str = "users";
pub const SESSION_KEY: &str = "user";

fn hash_password(user_id: u64, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}:{}", user_id, password).as_bytes());
    hex::encode(hasher.finalize())
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Stored shape of a user. Older directories kept the plain `password`;
/// it is hashed on load and the hash is what gets written back.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRecord {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub password: Option<String>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        let password_hash = match (record.password_hash, record.password) {
            (Some(hash), _) if !hash.is_empty() => hash,
            (_, Some(plain)) => {
                log::info!(
                    "[taskdeck.auth] Hashing plaintext password of user {}",
                    record.id
                );
                hash_password(record.id, &plain)
            }
            _ => String::new(),
        };
        User {
            id: record.id,
            name: record.name,
            email: record.email,
            password_hash,
        }
    }
}

pub struct UserDirectory {
    storage: Arc<dyn KeyValueStore>,
}

impl UserDirectory {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    pub fn users(&self) -> Result<Vec<User>, StorageError> {
        match self.storage.get(USERS_KEY)? {
            Some(payload) if !payload.trim().is_empty() => Ok(serde_json::from_str(&payload)?),
            _ => Ok(Vec::new()),
        }
    }

    fn save_users(&self, users: &[User]) -> Result<(), StorageError> {
        self.storage.set(USERS_KEY, &serde_json::to_string(users)?)
    }

    fn set_current(&self, user: &User) -> Result<(), StorageError> {
        self.storage.set(SESSION_KEY, &serde_json::to_string(user)?)
    }

    /// Create an account and sign it in. `None` when the email is taken or
    /// the name or email is blank.
    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<Option<User>, StorageError> {
        let (name, email) = (name.trim(), email.trim());
        if name.is_empty() || email.is_empty() {
            return Ok(None);
        }
        let mut users = self.users()?;
        let key = email_key(email);
        if users.iter().any(|u| email_key(&u.email) == key) {
            log::info!("[taskdeck.auth] Registration refused, email already in use");
            return Ok(None);
        }

        let id = ids::next_id(users.iter().map(|u| u.id));
        let user = User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: hash_password(id, password),
        };
        users.push(user.clone());
        self.save_users(&users)?;
        self.set_current(&user)?;
        log::info!("[taskdeck.auth] Registered user: {} ({})", user.name, user.id);
        Ok(Some(user))
    }

    /// Sign in. `None` for an unknown email or a wrong password.
    pub fn login(&self, email: &str, password: &str) -> Result<Option<User>, StorageError> {
        let key = email_key(email);
        let found = self
            .users()?
            .into_iter()
            .find(|u| {
                email_key(&u.email) == key
                    && !u.password_hash.is_empty()
                    && u.password_hash == hash_password(u.id, password)
            });
        if let Some(user) = &found {
            self.set_current(user)?;
            log::info!("[taskdeck.auth] Signed in user {}", user.id);
        }
        Ok(found)
    }

    pub fn logout(&self) -> Result<(), StorageError> {
        self.storage.remove(SESSION_KEY)
    }

    /// The user recorded as signed in, if any.
    pub fn current_user(&self) -> Result<Option<User>, StorageError> {
        match self.storage.get(SESSION_KEY)? {
            Some(payload) if !payload.trim().is_empty() => Ok(Some(serde_json::from_str(&payload)?)),
            _ => Ok(None),
        }
    }
}

/// The signed-in user together with their board store. Signing in, out or
/// registering switches the store to the matching boards.
pub struct Session {
    directory: UserDirectory,
    store: BoardStore,
    user: Option<User>,
    restore_error: Option<StorageError>,
}

impl Session {
    /// Resume whatever session was recorded in storage.
    ///
    /// If the recorded user's boards cannot be loaded the session starts
    /// signed out and the error is kept for `take_restore_error`.
    pub fn restore(storage: Arc<dyn KeyValueStore>) -> Result<Self, StorageError> {
        let directory = UserDirectory::new(storage.clone());
        let mut session = Self {
            directory,
            store: BoardStore::new(storage),
            user: None,
            restore_error: None,
        };
        let user = session.directory.current_user()?;
        if let Err(e) = session.enter(user) {
            log::warn!("[taskdeck.auth] Could not resume session, signed out: {}", e);
            session.restore_error = Some(e);
        }
        Ok(session)
    }

    /// The error that prevented the recorded session from resuming, if any.
    pub fn take_restore_error(&mut self) -> Option<StorageError> {
        self.restore_error.take()
    }

    pub fn register(&mut self, name: &str, email: &str, password: &str) -> Result<Option<User>, StorageError> {
        let user = self.directory.register(name, email, password)?;
        if user.is_some() {
            self.enter(user.clone())?;
        }
        Ok(user)
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<Option<User>, StorageError> {
        let user = self.directory.login(email, password)?;
        if user.is_some() {
            self.enter(user.clone())?;
        }
        Ok(user)
    }

    pub fn logout(&mut self) -> Result<(), StorageError> {
        self.directory.logout()?;
        self.enter(None)
    }

    fn enter(&mut self, user: Option<User>) -> Result<(), StorageError> {
        let user_id = user.as_ref().map(|u| u.id.to_string());
        self.user = None;
        self.store.switch_identity(user_id.as_deref())?;
        self.user = user;
        Ok(())
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut BoardStore {
        &mut self.store
    }
}
