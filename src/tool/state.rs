//! Purchase Tool Session State
//!
//! Each activated purchase tool lives in a session, keyed by a generated id,
//! so several host pages can drive their own controller.

use super::controller::PurchaseTool;
use crate::config::Config;
use crate::ports::Ports;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

/// Core application state containing active sessions and the ports they use
pub struct AppState {
    /// Active controllers, keyed by session id.
    /// DashMap allows concurrent access without external Mutexes.
    pub sessions: DashMap<String, Arc<PurchaseTool>>,

    /// External collaborators handed to every new controller
    pub ports: Ports,

    pub config: Config,
}

impl AppState {
    pub fn new(ports: Ports, config: Config) -> Self {
        Self {
            sessions: DashMap::new(),
            ports,
            config,
        }
    }

    /// Activates a controller for `account_id` and stores it under a new
    /// session id.
    pub async fn open_session(&self, account_id: &str) -> (String, Arc<PurchaseTool>) {
        let tool = Arc::new(
            PurchaseTool::activate(account_id, &self.ports, &self.config.item_entity).await,
        );
        let session_id = Uuid::new_v4().simple().to_string();
        self.sessions.insert(session_id.clone(), tool.clone());
        info!(session_id = %session_id, account_id, "Session opened");
        (session_id, tool)
    }

    pub fn session(&self, session_id: &str) -> Option<Arc<PurchaseTool>> {
        self.sessions.get(session_id).map(|s| s.value().clone())
    }

    /// Drops a session. Returns `false` if it did not exist.
    pub fn close_session(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            info!(session_id, "Session closed");
        }
        removed
    }
}
