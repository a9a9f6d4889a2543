use std::sync::Arc;

use log::{debug, info, warn};

use crate::backend::automation::{Automation, AutomationError};
use crate::error::ConvertError;
use crate::models::backend::{BackendAvailability, BackendKind};
use crate::service::traits::i_service::ProbeServiceTrait;

/// 探測服務：啟動後立即結束每種後端，以判斷目前是否可用
pub struct ProbeService {
    automation: Arc<dyn Automation>,
}

impl ProbeService {
    pub fn new(automation: Arc<dyn Automation>) -> Self {
        ProbeService { automation }
    }

    fn probe_one(&self, kind: BackendKind) -> bool {
        match self.automation.launch(kind) {
            Ok(mut session) => {
                if let Err(e) = session.quit() {
                    warn!("探測後結束 {} 失敗（已忽略）：{}", kind, e);
                }
                true
            }
            Err(e) => {
                debug!("{} 無法啟動：{}", kind, e);
                false
            }
        }
    }
}

impl ProbeServiceTrait for ProbeService {
    fn check_dependency(&self) -> Result<(), ConvertError> {
        self.automation.check().map_err(|e| match e {
            AutomationError::Missing(msg) | AutomationError::Failed(msg) => {
                ConvertError::DependencyMissing(msg)
            }
        })
    }

    fn probe(&self, kinds: &[BackendKind]) -> BackendAvailability {
        let availability: BackendAvailability =
            kinds.iter().map(|kind| (*kind, self.probe_one(*kind))).collect();
        for (kind, available) in availability.iter() {
            info!("  - {}: {}", kind, if available { "✓ 已安裝" } else { "✗ 未偵測到" });
        }
        availability
    }
}
