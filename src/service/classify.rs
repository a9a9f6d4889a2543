use std::sync::OnceLock;

use log::warn;
use regex::RegexSet;

use crate::error::ErrorKind;

// 依優先順序排列；比對的是應用程式回傳的人類可讀訊息，只能當作啟發式判斷
const DOCUMENT_INCOMPATIBLE: &[&str] = &[
    r"此命令[无無]效",
    r"(?i)command failed",
    r"(?i)this command is not available",
    r"(?i)missing fonts?",
    r"(?i)document is (locked for editing|protected)",
    r"(?i)corrupt",
    r"[损損][坏壞]",
];

const APPLICATION_NOT_REGISTERED: &[&str] = &[
    r"[没沒]有[注註]册?冊?[类類]",
    r"(?i)class not registered",
    r"(?i)invalid class string",
    r"(?i)cannot load com type",
    r"(?i)REGDB_E_CLASSNOTREG",
    r"(?i)80040154",
    r"(?i)800401F3",
];

const RESOURCE_BUSY: &[&str] = &[
    r"拒[绝絕](存取|[访訪][问問])",
    r"([访訪][问問]|存取)被拒[绝絕]?",
    r"[访訪]拒[绝絕]",
    r"(?i)access (is )?denied",
    r"(?i)being used by another process",
    r"(?i)file (is )?(locked|in use)",
    r"(?i)80070005",
    r"(?i)80070020",
];

fn classifiers() -> &'static [(ErrorKind, RegexSet)] {
    static CLASSIFIERS: OnceLock<Vec<(ErrorKind, RegexSet)>> = OnceLock::new();
    CLASSIFIERS.get_or_init(|| {
        [
            (ErrorKind::DocumentIncompatible, DOCUMENT_INCOMPATIBLE),
            (ErrorKind::ApplicationNotRegistered, APPLICATION_NOT_REGISTERED),
            (ErrorKind::ResourceBusy, RESOURCE_BUSY),
        ]
        .into_iter()
        .map(|(kind, patterns)| {
            let set = RegexSet::new(patterns).unwrap_or_else(|e| {
                warn!("無效的錯誤分類模式: {}，使用空集作為回退", e);
                RegexSet::empty()
            });
            (kind, set)
        })
        .collect()
    })
}

/// 將開啟或另存步驟的原始錯誤訊息分類，無法辨識時歸為 Unknown
pub fn classify_failure(message: &str) -> ErrorKind {
    classifiers()
        .iter()
        .find(|(_, set)| set.is_match(message))
        .map(|(kind, _)| *kind)
        .unwrap_or(ErrorKind::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failed_is_document_problem() {
        assert_eq!(classify_failure("此命令无效。"), ErrorKind::DocumentIncompatible);
        assert_eq!(
            classify_failure("Exception calling \"SaveAs2\": Command failed"),
            ErrorKind::DocumentIncompatible
        );
        assert_eq!(classify_failure("The file appears to be corrupted."), ErrorKind::DocumentIncompatible);
    }

    #[test]
    fn class_not_registered() {
        assert_eq!(classify_failure("没有注册类"), ErrorKind::ApplicationNotRegistered);
        assert_eq!(
            classify_failure("Retrieving the COM class factory failed due to: Class not registered (Exception from HRESULT: 0x80040154 (REGDB_E_CLASSNOTREG))."),
            ErrorKind::ApplicationNotRegistered
        );
        assert_eq!(classify_failure("Invalid class string"), ErrorKind::ApplicationNotRegistered);
    }

    #[test]
    fn access_denied_is_busy() {
        assert_eq!(classify_failure("拒绝访问。"), ErrorKind::ResourceBusy);
        assert_eq!(classify_failure("Access is denied. (0x80070005)"), ErrorKind::ResourceBusy);
        assert_eq!(
            classify_failure("The process cannot access the file because it is being used by another process."),
            ErrorKind::ResourceBusy
        );
    }

    #[test]
    fn priority_order_wins_on_overlap() {
        assert_eq!(
            classify_failure("Command failed: Access denied"),
            ErrorKind::DocumentIncompatible
        );
        assert_eq!(
            classify_failure("Class not registered; access denied"),
            ErrorKind::ApplicationNotRegistered
        );
    }

    #[test]
    fn unrecognized_text_falls_back_to_unknown() {
        assert_eq!(classify_failure("RPC server unavailable"), ErrorKind::Unknown);
        assert_eq!(classify_failure(""), ErrorKind::Unknown);
    }
}
