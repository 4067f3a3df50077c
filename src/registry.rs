//! Recipient registry: idempotent registration on top of the record store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Local;

use crate::models::Recipient;
use crate::sheets::StoreError;
use crate::store::PadharamaniStore;

/// Store operations the registry needs. The indirection keeps the
/// check-then-act logic testable without a spreadsheet.
#[async_trait]
pub trait RecipientStore {
    async fn list(&self) -> Result<Vec<Recipient>, StoreError>;
    async fn append(&self, recipient: &Recipient) -> Result<(), StoreError>;
}

#[async_trait]
impl RecipientStore for PadharamaniStore {
    async fn list(&self) -> Result<Vec<Recipient>, StoreError> {
        self.recipients().await
    }

    async fn append(&self, recipient: &Recipient) -> Result<(), StoreError> {
        self.append_recipient(recipient).await
    }
}

#[async_trait]
impl<S: RecipientStore + Send + Sync> RecipientStore for Arc<S> {
    async fn list(&self) -> Result<Vec<Recipient>, StoreError> {
        (**self).list().await
    }

    async fn append(&self, recipient: &Recipient) -> Result<(), StoreError> {
        (**self).append(recipient).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Registered,
    AlreadyRegistered,
}

pub struct Registry<S> {
    store: S,
    // Serializes the check-then-act sequence within this process. The sheet
    // has no conditional append, so cross-process races stay possible.
    write_lock: tokio::sync::Mutex<()>,
}

impl<S: RecipientStore + Sync> Registry<S> {
    pub fn new(store: S) -> Self {
        Self { store, write_lock: tokio::sync::Mutex::new(()) }
    }

    /// Register `chat_id` unless it is already present. Re-registering is a
    /// no-op, not an error.
    pub async fn register(
        &self,
        chat_id: i64,
        name: &str,
    ) -> Result<RegisterOutcome, StoreError> {
        let _guard = self.write_lock.lock().await;
        let existing = self.store.list().await?;
        if existing.iter().any(|r| r.chat_id == chat_id) {
            log::info!("Chat {chat_id} is already registered");
            return Ok(RegisterOutcome::AlreadyRegistered);
        }
        let recipient = Recipient {
            chat_id,
            name: name.to_string(),
            registration_date: Local::now()
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
        };
        self.store.append(&recipient).await?;
        log::info!("Registered {name} ({chat_id})");
        Ok(RegisterOutcome::Registered)
    }

    pub async fn list_for_delivery(&self) -> Result<Vec<Recipient>, StoreError> {
        self.store.list().await
    }
}
