//! Deterministic fixtures
//!
//! Fixed secrets, clocks, engines and stores so tests produce reproducible
//! tokens and responses.

use common::secret::secret_bytes;
use keel_jwt::{FixedClock, HmacEngine, TokenEngine};
use keel_web::config::MIN_BCRYPT_COST;
use keel_web::crypto::hash_password;
use keel_web::models::User;
use keel_web::stores::{InMemoryUserStore, SettingStore, StoreError, UserStore};
use std::sync::Arc;

/// Signing secret shared by test engines.
pub const TEST_SECRET: &str = "secret";

/// 2018-01-01T00:00:00Z, the instant golden tokens are issued at.
pub const TEST_CLOCK_SECS: i64 = 1_514_764_800;

/// Username of the user seeded by [`seeded_user_store`].
pub const TEST_USERNAME: &str = "alice";

/// Password of the seeded user.
pub const TEST_PASSWORD: &str = "correct horse battery staple";

/// bcrypt cost for test hashes. The minimum keeps tests fast.
pub const TEST_BCRYPT_COST: u32 = MIN_BCRYPT_COST;

/// Engine signing with [`TEST_SECRET`] against the system clock.
pub fn test_engine() -> Arc<dyn TokenEngine> {
    Arc::new(HmacEngine::with_default_lease(secret_bytes(TEST_SECRET)).expect("test secret is not empty"))
}

/// Engine signing with `secret` against the system clock.
pub fn engine_with_secret(secret: &str) -> Arc<dyn TokenEngine> {
    Arc::new(HmacEngine::with_default_lease(secret_bytes(secret)).expect("test secret must not be empty"))
}

/// Engine whose clock is frozen at `secs`.
pub fn fixed_clock_engine(secs: i64) -> Arc<dyn TokenEngine> {
    let clock = FixedClock::at_timestamp(secs).expect("timestamp in range");
    Arc::new(
        HmacEngine::with_default_lease(secret_bytes(TEST_SECRET))
            .expect("test secret is not empty")
            .with_clock(Arc::new(clock)),
    )
}

/// User store holding `users` with ids assigned from 1, in order.
pub async fn user_store_with(users: &[(&str, &str)]) -> Arc<InMemoryUserStore> {
    let store = Arc::new(InMemoryUserStore::new());
    for (username, password) in users {
        let hash = hash_password(password, TEST_BCRYPT_COST).expect("hashing test password");
        let id = store.next_id().await;
        store
            .save(User::new(id, *username, hash))
            .await
            .expect("seeding test user");
    }
    store
}

/// User store holding [`TEST_USERNAME`] as user 1.
pub async fn seeded_user_store() -> Arc<InMemoryUserStore> {
    user_store_with(&[(TEST_USERNAME, TEST_PASSWORD)]).await
}

/// Store whose every operation fails with a backend error.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingStore;

fn backend_error() -> StoreError {
    StoreError::Backend("store unavailable".to_string())
}

#[async_trait::async_trait]
impl UserStore for FailingStore {
    async fn find(&self, _id: u64) -> Result<User, StoreError> {
        Err(backend_error())
    }

    async fn find_by_username(&self, _username: &str) -> Result<User, StoreError> {
        Err(backend_error())
    }

    async fn save(&self, _user: User) -> Result<(), StoreError> {
        Err(backend_error())
    }
}

#[async_trait::async_trait]
impl SettingStore for FailingStore {
    async fn get(&self, _user_id: u64, _key: &str) -> Result<String, StoreError> {
        Err(backend_error())
    }

    async fn set(&self, _user_id: u64, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(backend_error())
    }
}
