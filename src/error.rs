use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::backend::BackendKind;

/// 阻止批次開始的錯誤，直接回報給控制端
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("路徑 '{}' 不存在或不是目錄", .0.display())]
    PathNotFound(PathBuf),

    #[error("未偵測到可用的 Office 應用程式，請安裝 Microsoft Word 或 WPS Office")]
    NoBackendAvailable,

    #[error("未偵測到 {}，請安裝或選擇其他轉換方式", .0.display_name())]
    BackendUnavailable(BackendKind),

    #[error("自動化元件不可用：{0}")]
    DependencyMissing(String),

    #[error("尚未就緒：{0}")]
    NotReady(String),

    #[error("IO 錯誤：{0}")]
    Io(#[from] io::Error),
}

impl From<ConvertError> for io::Error {
    fn from(err: ConvertError) -> Self {
        match err {
            ConvertError::Io(e) => e,
            ConvertError::PathNotFound(_) => io::Error::new(io::ErrorKind::NotFound, err.to_string()),
            ConvertError::NotReady(_) => io::Error::new(io::ErrorKind::InvalidInput, err.to_string()),
            _ => io::Error::new(io::ErrorKind::Other, err.to_string()),
        }
    }
}

/// 單一檔案轉換失敗的分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 缺字型、受保護內容或格式損壞，需手動修正文件
    DocumentIncompatible,
    /// 後端未在本機註冊
    ApplicationNotRegistered,
    /// 檔案被佔用或拒絕存取
    ResourceBusy,
    /// 另存呼叫成功但輸出檔不存在
    OutputNotProduced,
    DependencyMissing,
    Unknown,
}

impl ErrorKind {
    pub fn describe(&self) -> &'static str {
        match self {
            ErrorKind::DocumentIncompatible => "文件不相容（缺失字型、受保護內容或格式損壞）",
            ErrorKind::ApplicationNotRegistered => "應用程式未正確安裝或註冊",
            ErrorKind::ResourceBusy => "檔案權限問題或檔案被佔用",
            ErrorKind::OutputNotProduced => "未產生 PDF 檔案",
            ErrorKind::DependencyMissing => "自動化元件不可用",
            ErrorKind::Unknown => "未知錯誤",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::DocumentIncompatible => "DocumentIncompatible",
            ErrorKind::ApplicationNotRegistered => "ApplicationNotRegistered",
            ErrorKind::ResourceBusy => "ResourceBusy",
            ErrorKind::OutputNotProduced => "OutputNotProduced",
            ErrorKind::DependencyMissing => "DependencyMissing",
            ErrorKind::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// 後端轉換單一檔案失敗時回傳的錯誤，保留原始訊息供診斷
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct ConversionError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ConversionError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ConversionError { kind, message: message.into() }
    }
}
