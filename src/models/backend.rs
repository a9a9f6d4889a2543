use std::collections::BTreeMap;
use std::fmt;

use crate::error::ConvertError;

/// 可驅動的 Office 應用程式種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackendKind {
    Word,
    Wps,
}

impl BackendKind {
    /// 自動模式的固定優先順序：Word 優先，其次 WPS
    pub const PRIORITY: [BackendKind; 2] = [BackendKind::Word, BackendKind::Wps];

    /// 自動化介面使用的應用程式識別名稱
    pub fn prog_id(&self) -> &'static str {
        match self {
            BackendKind::Word => "Word.Application",
            BackendKind::Wps => "KWPS.Application",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            BackendKind::Word => "Microsoft Word",
            BackendKind::Wps => "WPS Office",
        }
    }

    pub fn all() -> &'static [BackendKind] {
        &Self::PRIORITY
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// 單次探測的結果，每次執行前重新產生，不跨執行快取
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendAvailability {
    verdicts: BTreeMap<BackendKind, bool>,
}

impl BackendAvailability {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, kind: BackendKind, available: bool) {
        self.verdicts.insert(kind, available);
    }

    pub fn is_available(&self, kind: BackendKind) -> bool {
        self.verdicts.get(&kind).copied().unwrap_or(false)
    }

    pub fn any_available(&self) -> bool {
        self.verdicts.values().any(|v| *v)
    }

    /// 依固定優先順序列出可用的後端
    pub fn available_kinds(&self) -> Vec<BackendKind> {
        BackendKind::PRIORITY
            .iter()
            .copied()
            .filter(|k| self.is_available(*k))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BackendKind, bool)> + '_ {
        self.verdicts.iter().map(|(k, v)| (*k, *v))
    }
}

impl FromIterator<(BackendKind, bool)> for BackendAvailability {
    fn from_iter<I: IntoIterator<Item = (BackendKind, bool)>>(iter: I) -> Self {
        BackendAvailability { verdicts: iter.into_iter().collect() }
    }
}

/// 後端選擇策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    #[default]
    Auto,
    Force(BackendKind),
}

impl SelectionPolicy {
    pub fn parse(value: &str) -> Option<SelectionPolicy> {
        match value.to_ascii_lowercase().as_str() {
            "auto" => Some(SelectionPolicy::Auto),
            "word" => Some(SelectionPolicy::Force(BackendKind::Word)),
            "wps" => Some(SelectionPolicy::Force(BackendKind::Wps)),
            _ => None,
        }
    }

    /// 在給定的可用性下決定實際使用的後端
    pub fn resolve(&self, availability: &BackendAvailability) -> Result<BackendKind, ConvertError> {
        match self {
            SelectionPolicy::Auto => BackendKind::PRIORITY
                .iter()
                .copied()
                .find(|k| availability.is_available(*k))
                .ok_or(ConvertError::NoBackendAvailable),
            SelectionPolicy::Force(kind) => {
                if availability.is_available(*kind) {
                    Ok(*kind)
                } else if !availability.any_available() {
                    Err(ConvertError::NoBackendAvailable)
                } else {
                    Err(ConvertError::BackendUnavailable(*kind))
                }
            }
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionPolicy::Auto => f.write_str("自動偵測"),
            SelectionPolicy::Force(kind) => write!(f, "指定 {}", kind),
        }
    }
}
