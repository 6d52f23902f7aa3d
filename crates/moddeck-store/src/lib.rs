//! File-backed account storage for dashboard logins.
//!
//! Accounts live in a single JSON document that is read in full and rewritten
//! in full on every mutation. A store-wide mutex is held across each whole
//! read-modify-write cycle, so the uniqueness pre-check and the insert that
//! follows it are atomic with respect to other requests.

use std::path::PathBuf;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use moddeck_types::{Account, CreateUserRequest, Role};

const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Username already exists")]
    DuplicateUsername,
    #[error("Cannot delete your own account")]
    SelfDeletion,
    #[error("User not found")]
    NotFound,
    #[error("account file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("account file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("password hashing failed")]
    Hash,
}

pub struct AccountStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl AccountStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        AccountStore {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Account>, StoreError> {
        let _guard = self.lock.lock().await;
        let accounts = self.read_all().await?;
        Ok(accounts.into_iter().find(|a| a.id == id))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let _guard = self.lock.lock().await;
        let accounts = self.read_all().await?;
        Ok(accounts.into_iter().find(|a| a.username == username))
    }

    pub async fn list_all(&self) -> Result<Vec<Account>, StoreError> {
        let _guard = self.lock.lock().await;
        self.read_all().await
    }

    /// Create an account. The username uniqueness check and the insert happen
    /// under one lock hold; the password is hashed before anything is written.
    pub async fn create(&self, req: CreateUserRequest) -> Result<Account, StoreError> {
        let _guard = self.lock.lock().await;
        let mut accounts = self.read_all().await?;

        if accounts.iter().any(|a| a.username == req.username) {
            return Err(StoreError::DuplicateUsername);
        }

        let account = Account {
            id: accounts.iter().map(|a| a.id).max().unwrap_or(0) + 1,
            username: req.username,
            password: hash_password(&req.password)?,
            role: req.role,
            created_at: Utc::now(),
            last_login: None,
        };

        accounts.push(account.clone());
        self.write_all(&accounts).await?;
        info!("Created account {} ({})", account.username, account.id);
        Ok(account)
    }

    /// Delete an account by id. Callers pass their own id so the store can
    /// refuse self-deletion outright.
    pub async fn delete(&self, id: i64, acting_id: i64) -> Result<(), StoreError> {
        if id == acting_id {
            return Err(StoreError::SelfDeletion);
        }

        let _guard = self.lock.lock().await;
        let mut accounts = self.read_all().await?;
        let before = accounts.len();
        accounts.retain(|a| a.id != id);
        if accounts.len() == before {
            return Err(StoreError::NotFound);
        }
        self.write_all(&accounts).await?;
        info!("Deleted account {}", id);
        Ok(())
    }

    pub async fn update_last_login(&self, id: i64) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut accounts = self.read_all().await?;
        if let Some(account) = accounts.iter_mut().find(|a| a.id == id) {
            account.last_login = Some(Utc::now());
            self.write_all(&accounts).await?;
        }
        Ok(())
    }

    /// Verify a plaintext password against a stored argon2 hash. A hash that
    /// fails to parse counts as a mismatch rather than an error.
    pub fn verify_password(&self, plain: &str, hash: &str) -> bool {
        match PasswordHash::new(hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(plain.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    /// Read the whole account file. A missing file seeds a default admin
    /// account so a fresh deployment has a working login.
    async fn read_all(&self) -> Result<Vec<Account>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let admin = Account {
                    id: 1,
                    username: DEFAULT_ADMIN_USERNAME.into(),
                    password: hash_password(DEFAULT_ADMIN_PASSWORD)?,
                    role: Role::Admin,
                    created_at: Utc::now(),
                    last_login: None,
                };
                self.write_all(std::slice::from_ref(&admin)).await?;
                info!("Seeded account file with default admin at {}", self.path.display());
                Ok(vec![admin])
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, accounts: &[Account]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(accounts)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

fn hash_password(plain: &str) -> Result<String, StoreError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|_| StoreError::Hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_store(prefix: &str) -> AccountStore {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        let path: PathBuf = std::env::temp_dir().join(format!("{prefix}-{ts}/users.json"));
        AccountStore::new(path)
    }

    fn new_user(username: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: username.into(),
            password: "secret123".into(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn fresh_store_seeds_default_admin() {
        let store = temp_store("moddeck-seed");
        let accounts = store.list_all().await.unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].username, "admin");
        assert_eq!(accounts[0].role, Role::Admin);
        assert!(store.verify_password("admin123", &accounts[0].password));
    }

    #[tokio::test]
    async fn create_assigns_monotonic_ids_and_hashes() {
        let store = temp_store("moddeck-create");
        let a = store.create(new_user("alice")).await.unwrap();
        let b = store.create(new_user("bob")).await.unwrap();
        assert_eq!(a.id, 2); // admin took id 1
        assert_eq!(b.id, 3);
        assert_ne!(a.password, "secret123");
        assert!(store.verify_password("secret123", &a.password));
        assert!(!store.verify_password("wrong", &a.password));
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let store = temp_store("moddeck-dup");
        store.create(new_user("alice")).await.unwrap();
        let err = store.create(new_user("alice")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUsername));
        assert_eq!(store.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn self_deletion_is_rejected() {
        let store = temp_store("moddeck-selfdel");
        let err = store.delete(1, 1).await.unwrap_err();
        assert!(matches!(err, StoreError::SelfDeletion));
    }

    #[tokio::test]
    async fn delete_removes_and_reports_missing() {
        let store = temp_store("moddeck-del");
        let alice = store.create(new_user("alice")).await.unwrap();
        store.delete(alice.id, 1).await.unwrap();
        assert!(store.get_by_id(alice.id).await.unwrap().is_none());
        let err = store.delete(alice.id, 1).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn last_login_is_recorded() {
        let store = temp_store("moddeck-login");
        let alice = store.create(new_user("alice")).await.unwrap();
        assert!(alice.last_login.is_none());
        store.update_last_login(alice.id).await.unwrap();
        let reread = store.get_by_id(alice.id).await.unwrap().unwrap();
        assert!(reread.last_login.is_some());
    }

    #[tokio::test]
    async fn accounts_survive_reopen() {
        let store = temp_store("moddeck-reopen");
        let alice = store.create(new_user("alice")).await.unwrap();
        let path = store.path.clone();
        drop(store);

        let reopened = AccountStore::new(path);
        let found = reopened.get_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, alice.id);
    }
}
