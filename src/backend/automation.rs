use std::path::Path;

use log::{debug, warn};
use thiserror::Error;

use crate::models::backend::BackendKind;

/// 自動化層回報的原始錯誤
#[derive(Debug, Clone, Error)]
pub enum AutomationError {
    /// 自動化層本身不存在（例如非 Windows 或找不到 PowerShell）
    #[error("{0}")]
    Missing(String),
    /// 應用程式呼叫失敗，保留原始訊息
    #[error("{0}")]
    Failed(String),
}

/// 開啟文件時的選項
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    pub confirm_conversions: bool,
    pub read_only: bool,
    pub add_to_recent_files: bool,
    /// 只有 Word 接受 Revert 參數
    pub revert: Option<bool>,
}

impl Default for OpenOptions {
    fn default() -> Self {
        OpenOptions {
            confirm_conversions: false,
            read_only: true,
            add_to_recent_files: false,
            revert: None,
        }
    }
}

/// 外部應用程式的自動化入口
pub trait Automation: Send + Sync {
    /// 確認自動化層可用
    fn check(&self) -> Result<(), AutomationError>;

    /// 啟動一個全新的應用程式實例，僅供單次轉換使用
    fn launch(&self, kind: BackendKind) -> Result<Box<dyn ApplicationSession>, AutomationError>;
}

/// 單一應用程式實例的能力介面：開啟、另存、關閉、結束
pub trait ApplicationSession: Send {
    /// 隱藏視窗並停用警告對話框
    fn set_headless(&mut self) -> Result<(), AutomationError>;
    fn open_document(&mut self, path: &Path, options: &OpenOptions) -> Result<(), AutomationError>;
    fn save_active_as(&mut self, target: &Path, format_code: i32) -> Result<(), AutomationError>;
    /// 關閉目前文件，不儲存變更
    fn close_document(&mut self) -> Result<(), AutomationError>;
    fn quit(&mut self) -> Result<(), AutomationError>;
}

/// 應用程式實例的持有者，離開作用域時必定結束實例
pub struct ApplicationGuard {
    kind: BackendKind,
    session: Option<Box<dyn ApplicationSession>>,
}

impl ApplicationGuard {
    pub fn new(kind: BackendKind, session: Box<dyn ApplicationSession>) -> Self {
        ApplicationGuard { kind, session: Some(session) }
    }

    pub fn set_headless(&mut self) -> Result<(), AutomationError> {
        self.session_mut()?.set_headless()
    }

    /// 開啟文件並回傳文件作用域；文件作用域結束前應用程式不會被結束
    pub fn open<'a>(
        &'a mut self,
        path: &Path,
        options: &OpenOptions,
    ) -> Result<DocumentGuard<'a>, AutomationError> {
        self.session_mut()?.open_document(path, options)?;
        Ok(DocumentGuard { app: self, open: true })
    }

    /// 明確結束實例並回傳結果；之後 Drop 不再重複結束
    pub fn quit(mut self) -> Result<(), AutomationError> {
        match self.session.take() {
            Some(mut session) => session.quit(),
            None => Ok(()),
        }
    }

    fn session_mut(&mut self) -> Result<&mut Box<dyn ApplicationSession>, AutomationError> {
        self.session
            .as_mut()
            .ok_or_else(|| AutomationError::Failed("應用程式實例已結束".to_string()))
    }
}

impl Drop for ApplicationGuard {
    fn drop(&mut self) {
        if let Some(mut session) = self.session.take() {
            match session.quit() {
                Ok(()) => debug!("{} 實例已結束", self.kind),
                Err(e) => warn!("結束 {} 實例失敗（已忽略）：{}", self.kind, e),
            }
        }
    }
}

/// 已開啟文件的作用域，位於應用程式作用域之內
pub struct DocumentGuard<'a> {
    app: &'a mut ApplicationGuard,
    open: bool,
}

impl DocumentGuard<'_> {
    pub fn save_as(&mut self, target: &Path, format_code: i32) -> Result<(), AutomationError> {
        self.app.session_mut()?.save_active_as(target, format_code)
    }

    /// 明確關閉文件；之後 Drop 不再重複關閉
    pub fn close(mut self) -> Result<(), AutomationError> {
        self.open = false;
        self.app.session_mut()?.close_document()
    }
}

impl Drop for DocumentGuard<'_> {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        let kind = self.app.kind;
        match self.app.session_mut().and_then(|s| s.close_document()) {
            Ok(()) => debug!("{} 文件已關閉", kind),
            Err(e) => warn!("關閉 {} 文件失敗（已忽略）：{}", kind, e),
        }
    }
}
