use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use log::{debug, warn};

use crate::backend::automation::{ApplicationGuard, Automation, AutomationError, OpenOptions};
use crate::backend::word::WordAdapter;
use crate::backend::wps::WpsAdapter;
use crate::error::{ConversionError, ErrorKind};
use crate::models::backend::BackendKind;
use crate::models::conversion::PDF_FORMAT_CODE;
use crate::service::classify::classify_failure;

/// 每種後端一個實作，契約相同
pub trait BackendAdapter: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// 將 source 轉換為 target；成功代表 target 已存在於磁碟上
    fn convert(&self, source: &Path, target: &Path) -> Result<(), ConversionError>;
}

/// 依後端種類提供轉接器
pub trait AdapterProvider: Send + Sync {
    fn adapter(&self, kind: BackendKind) -> Box<dyn BackendAdapter>;
}

/// 以同一個自動化層建立各後端的轉接器
pub struct AutomationAdapterProvider {
    automation: Arc<dyn Automation>,
}

impl AutomationAdapterProvider {
    pub fn new(automation: Arc<dyn Automation>) -> Self {
        AutomationAdapterProvider { automation }
    }
}

impl AdapterProvider for AutomationAdapterProvider {
    fn adapter(&self, kind: BackendKind) -> Box<dyn BackendAdapter> {
        match kind {
            BackendKind::Word => Box::new(WordAdapter::new(self.automation.clone())),
            BackendKind::Wps => Box::new(WpsAdapter::new(self.automation.clone())),
        }
    }
}

fn into_conversion_error(err: AutomationError) -> ConversionError {
    match err {
        AutomationError::Missing(msg) => ConversionError::new(ErrorKind::DependencyMissing, msg),
        AutomationError::Failed(msg) => ConversionError::new(classify_failure(&msg), msg),
    }
}

/// 各後端共用的轉換流程：
/// 啟動實例、設為無介面、唯讀開啟、另存為 PDF、關閉文件、結束實例。
/// 任何步驟失敗時，文件與實例仍依序釋放，釋放失敗只記錄不回傳。
pub(crate) fn convert_with(
    automation: &dyn Automation,
    kind: BackendKind,
    options: &OpenOptions,
    source: &Path,
    target: &Path,
) -> Result<(), ConversionError> {
    remove_stale_output(target)?;
    let session = automation.launch(kind).map_err(into_conversion_error)?;
    let mut app = ApplicationGuard::new(kind, session);
    app.set_headless().map_err(into_conversion_error)?;

    {
        let mut doc = app.open(source, options).map_err(into_conversion_error)?;
        doc.save_as(target, PDF_FORMAT_CODE).map_err(into_conversion_error)?;
        if let Err(e) = doc.close() {
            warn!("關閉文件失敗（已忽略）：{}：{}", source.display(), e);
        }
    }

    if let Err(e) = app.quit() {
        warn!("結束 {} 實例失敗（已忽略）：{}", kind, e);
    }

    if !target.is_file() {
        return Err(ConversionError::new(
            ErrorKind::OutputNotProduced,
            format!("另存完成但未找到輸出檔：{}", target.display()),
        ));
    }
    debug!("{} 已輸出：{}", kind, target.display());
    Ok(())
}

/// 先刪除上次留下的輸出檔，轉換結束後只有本次另存的檔案才算成功
fn remove_stale_output(target: &Path) -> Result<(), ConversionError> {
    match fs::remove_file(target) {
        Ok(()) => {
            debug!("已刪除舊的輸出檔：{}", target.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ConversionError::new(
            ErrorKind::ResourceBusy,
            format!("無法覆寫輸出檔 {}：{}", target.display(), e),
        )),
    }
}
