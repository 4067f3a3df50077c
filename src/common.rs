//! Common state shared between bot modules.

use std::sync::Arc;

use crate::config::Config;
use crate::registry::Registry;
use crate::store::PadharamaniStore;

/// Wrapper around [`teloxide::dispatching::UpdateHandler`] to be used in
/// this crate.
pub type UpdateHandler = teloxide::dispatching::UpdateHandler<anyhow::Error>;

/// Bot environment: global state shared between all handlers, constructed
/// once at startup and passed by reference.
pub struct BotEnv {
    pub config: Arc<Config>,
    pub store: Arc<PadharamaniStore>,
    pub registry: Registry<Arc<PadharamaniStore>>,
}
