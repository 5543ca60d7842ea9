use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Utc;
use shared::{
    domain::Project,
    protocol::{BridgeEvent, HostIdentity, PublishResponse},
};
use tracing::{info, warn};

pub const DEFAULT_MESSAGE_TEXT: &str = "Hello from the workspace!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticKind {
    Success,
    Impact,
}

pub trait HostBridge: Send + Sync {
    fn is_available(&self) -> bool {
        true
    }
    fn identity(&self) -> Option<HostIdentity>;
    fn send_data(&self, data: &str) -> Result<()>;
    fn notify_haptic(&self, kind: HapticKind) -> Result<()>;
}

pub struct MissingHostBridge;

impl HostBridge for MissingHostBridge {
    fn is_available(&self) -> bool {
        false
    }

    fn identity(&self) -> Option<HostIdentity> {
        None
    }

    fn send_data(&self, _data: &str) -> Result<()> {
        Err(anyhow!("host bridge unavailable"))
    }

    fn notify_haptic(&self, _kind: HapticKind) -> Result<()> {
        Err(anyhow!("host bridge unavailable"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeDelivery {
    Sent,
    Unavailable,
    Failed(String),
}

impl BridgeDelivery {
    pub fn describe(&self) -> String {
        match self {
            BridgeDelivery::Sent => "sent to host".to_string(),
            BridgeDelivery::Unavailable => "bridge unavailable".to_string(),
            BridgeDelivery::Failed(reason) => format!("bridge delivery failed: {reason}"),
        }
    }
}

#[derive(Clone)]
pub struct BridgeEmitter {
    bridge: Arc<dyn HostBridge>,
}

impl BridgeEmitter {
    /// Resolves the host once: an absent or unavailable host is replaced by
    /// the no-op bridge for the rest of the session.
    pub fn resolve(bridge: Option<Arc<dyn HostBridge>>) -> Self {
        let bridge = match bridge {
            Some(bridge) if bridge.is_available() => bridge,
            _ => {
                info!("bridge: no host detected; running standalone");
                Arc::new(MissingHostBridge) as Arc<dyn HostBridge>
            }
        };
        Self { bridge }
    }

    pub fn identity(&self) -> Option<HostIdentity> {
        self.bridge.identity()
    }

    pub fn notify(&self, event: &BridgeEvent) -> BridgeDelivery {
        if !self.bridge.is_available() {
            info!(kind = event.kind(), "bridge: unavailable; event dropped");
            return BridgeDelivery::Unavailable;
        }

        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(err) => return BridgeDelivery::Failed(err.to_string()),
        };
        if let Err(err) = self.bridge.send_data(&payload) {
            warn!(kind = event.kind(), error = %err, "bridge: send failed");
            return BridgeDelivery::Failed(err.to_string());
        }
        if let Err(err) = self.bridge.notify_haptic(HapticKind::Success) {
            info!(error = %err, "bridge: haptic hint not supported");
        }
        info!(kind = event.kind(), bytes = payload.len(), "bridge: event sent");
        BridgeDelivery::Sent
    }

    pub fn haptic(&self, kind: HapticKind) -> BridgeDelivery {
        if !self.bridge.is_available() {
            return BridgeDelivery::Unavailable;
        }
        match self.bridge.notify_haptic(kind) {
            Ok(()) => BridgeDelivery::Sent,
            Err(err) => {
                info!(?kind, error = %err, "bridge: haptic hint not supported");
                BridgeDelivery::Failed(err.to_string())
            }
        }
    }

    pub fn user_message(&self, source: &str, text: &str) -> BridgeEvent {
        let identity = self.identity().unwrap_or_default();
        let text = match text.trim() {
            "" => DEFAULT_MESSAGE_TEXT.to_string(),
            trimmed => trimmed.to_string(),
        };
        BridgeEvent::UserMessage {
            source: source.to_string(),
            text,
            user: identity.user.unwrap_or_default(),
            color_scheme: identity.color_scheme,
            platform: identity.platform,
            ts: Utc::now(),
        }
    }
}

pub fn project_info_event(project: &Project, export_url: &str, file_count: usize) -> BridgeEvent {
    BridgeEvent::ProjectInfo {
        project_id: project.id.clone(),
        project_name: project.name.clone(),
        export_url: export_url.to_string(),
        file_count,
    }
}

pub fn project_published_event(
    project: &Project,
    export_url: &str,
    published: &PublishResponse,
) -> BridgeEvent {
    BridgeEvent::ProjectPublished {
        project_id: project.id.clone(),
        export_url: export_url.to_string(),
        repo: published.repo.clone(),
        html_url: published.html_url.clone(),
    }
}
