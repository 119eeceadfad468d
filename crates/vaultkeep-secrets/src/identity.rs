//! Session identity collaborator.

use async_trait::async_trait;
use tokio::sync::RwLock;
use vaultkeep_core::UserId;

use crate::error::Result;

/// Supplies the identity of the signed-in user.
///
/// `Ok(None)` means there is no valid session; the store refuses to touch
/// persistence in that case.
#[async_trait]
pub trait Identity: Send + Sync {
    async fn current_user(&self) -> Result<Option<UserId>>;
}

/// An identity fixed at construction, which can be signed out and back in.
///
/// Suits single-user installs and tests.
#[derive(Debug)]
pub struct StaticIdentity {
    user: RwLock<Option<UserId>>,
}

impl StaticIdentity {
    pub fn new(user: impl Into<UserId>) -> Self {
        Self {
            user: RwLock::new(Some(user.into())),
        }
    }

    /// An identity with no active session.
    pub fn signed_out() -> Self {
        Self {
            user: RwLock::new(None),
        }
    }

    pub async fn sign_in(&self, user: impl Into<UserId>) {
        *self.user.write().await = Some(user.into());
    }

    pub async fn sign_out(&self) {
        *self.user.write().await = None;
    }
}

#[async_trait]
impl Identity for StaticIdentity {
    async fn current_user(&self) -> Result<Option<UserId>> {
        Ok(self.user.read().await.clone())
    }
}
