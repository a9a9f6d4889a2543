use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConversionError, ErrorKind};
use crate::models::backend::BackendKind;

/// 輸出格式固定為 PDF
pub const TARGET_EXTENSION: &str = "pdf";
/// wdFormatPDF，Word 與 WPS 共用
pub const PDF_FORMAT_CODE: i32 = 17;
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["doc", "docx"];

/// 一個待轉換的檔案，建立後不可變
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTask {
    source: PathBuf,
    target: PathBuf,
}

impl ConversionTask {
    /// 輸出檔與來源同目錄，僅替換副檔名
    pub fn new(source: PathBuf) -> Self {
        let target = source.with_extension(TARGET_EXTENSION);
        ConversionTask { source, target }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

/// 單一檔案的轉換結果
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    Success {
        target: PathBuf,
        elapsed: Duration,
        output_size: u64,
    },
    Failure {
        kind: ErrorKind,
        message: String,
    },
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionOutcome::Success { .. })
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            ConversionOutcome::Failure { kind, .. } => Some(*kind),
            ConversionOutcome::Success { .. } => None,
        }
    }
}

impl From<ConversionError> for ConversionOutcome {
    fn from(err: ConversionError) -> Self {
        ConversionOutcome::Failure { kind: err.kind, message: err.message }
    }
}

/// 批次中一筆已記錄的結果
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    pub index: usize,
    pub task: ConversionTask,
    pub backend: BackendKind,
    pub outcome: ConversionOutcome,
}

/// 正規化後的副檔名集合（小寫、不含前導點）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSet {
    extensions: Vec<String>,
}

impl ExtensionSet {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for ext in extensions {
            let ext = ext.as_ref().trim().trim_start_matches('.').to_lowercase();
            if !ext.is_empty() && !normalized.contains(&ext) {
                normalized.push(ext);
            }
        }
        ExtensionSet { extensions: normalized }
    }

    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .map(|ext| self.extensions.iter().any(|e| *e == ext))
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.extensions
    }
}

impl Default for ExtensionSet {
    fn default() -> Self {
        ExtensionSet::new(DEFAULT_EXTENSIONS)
    }
}
