use std::path::Path;
use std::sync::Arc;

use crate::backend::adapter::{convert_with, BackendAdapter};
use crate::backend::automation::{Automation, OpenOptions};
use crate::error::ConversionError;
use crate::models::backend::BackendKind;

/// 透過金山 WPS 文字轉換，格式代碼與 Word 相同
pub struct WpsAdapter {
    automation: Arc<dyn Automation>,
}

impl WpsAdapter {
    pub fn new(automation: Arc<dyn Automation>) -> Self {
        WpsAdapter { automation }
    }
}

impl BackendAdapter for WpsAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Wps
    }

    fn convert(&self, source: &Path, target: &Path) -> Result<(), ConversionError> {
        convert_with(self.automation.as_ref(), BackendKind::Wps, &OpenOptions::default(), source, target)
    }
}
