use std::path::Path;
use std::sync::Arc;

use crate::backend::adapter::{convert_with, BackendAdapter};
use crate::backend::automation::{Automation, OpenOptions};
use crate::error::ConversionError;
use crate::models::backend::BackendKind;

/// 透過 Microsoft Word 轉換
pub struct WordAdapter {
    automation: Arc<dyn Automation>,
    options: OpenOptions,
}

impl WordAdapter {
    pub fn new(automation: Arc<dyn Automation>) -> Self {
        WordAdapter {
            automation,
            options: OpenOptions { revert: Some(false), ..OpenOptions::default() },
        }
    }
}

impl BackendAdapter for WordAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Word
    }

    fn convert(&self, source: &Path, target: &Path) -> Result<(), ConversionError> {
        convert_with(self.automation.as_ref(), BackendKind::Word, &self.options, source, target)
    }
}
