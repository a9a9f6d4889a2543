use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use office_to_pdf::backend::automation::{ApplicationSession, Automation, AutomationError, OpenOptions};
use office_to_pdf::facade::control::RunControl;
use office_to_pdf::models::backend::BackendKind;

/// 記憶體內的辦公軟體：只有已安裝的種類能啟動，指定檔名在開啟時失敗
#[derive(Default)]
pub struct FakeOffice {
    installed: Mutex<BTreeSet<BackendKind>>,
    automation_missing: Mutex<bool>,
    failures: HashMap<String, String>,
    launches: Mutex<Vec<BackendKind>>,
    opened: Mutex<Vec<String>>,
    cancel_on: Mutex<Option<(String, RunControl)>>,
}

impl FakeOffice {
    pub fn with_installed(kinds: &[BackendKind]) -> Self {
        FakeOffice {
            installed: Mutex::new(kinds.iter().copied().collect()),
            ..Default::default()
        }
    }

    pub fn failing(mut self, file_name: &str, message: &str) -> Self {
        self.failures.insert(file_name.to_string(), message.to_string());
        self
    }

    pub fn uninstall(&self, kind: BackendKind) {
        self.installed.lock().unwrap().remove(&kind);
    }

    /// 模擬自動化層本身不存在
    pub fn remove_automation(&self) {
        *self.automation_missing.lock().unwrap() = true;
    }

    pub fn launches(&self) -> Vec<BackendKind> {
        self.launches.lock().unwrap().clone()
    }

    /// 開啟指定檔案時，由控制端要求停止
    pub fn cancel_when_opening(&self, file_name: &str, control: RunControl) {
        *self.cancel_on.lock().unwrap() = Some((file_name.to_string(), control));
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

struct FakeSession {
    office: Arc<FakeOffice>,
    document: Option<PathBuf>,
}

impl ApplicationSession for FakeSession {
    fn set_headless(&mut self) -> Result<(), AutomationError> {
        Ok(())
    }

    fn open_document(&mut self, path: &Path, _: &OpenOptions) -> Result<(), AutomationError> {
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        self.office.opened.lock().unwrap().push(name.clone());
        if let Some((trigger, control)) = self.office.cancel_on.lock().unwrap().as_ref() {
            if *trigger == name {
                assert!(control.request_cancel());
            }
        }
        if let Some(message) = self.office.failures.get(&name) {
            return Err(AutomationError::Failed(message.clone()));
        }
        self.document = Some(path.to_path_buf());
        Ok(())
    }

    fn save_active_as(&mut self, target: &Path, _: i32) -> Result<(), AutomationError> {
        if self.document.is_none() {
            return Err(AutomationError::Failed("no active document".to_string()));
        }
        fs::write(target, b"%PDF-1.7").map_err(|e| AutomationError::Failed(e.to_string()))
    }

    fn close_document(&mut self) -> Result<(), AutomationError> {
        self.document = None;
        Ok(())
    }

    fn quit(&mut self) -> Result<(), AutomationError> {
        Ok(())
    }
}

pub struct SharedOffice(pub Arc<FakeOffice>);

impl Automation for SharedOffice {
    fn check(&self) -> Result<(), AutomationError> {
        if *self.0.automation_missing.lock().unwrap() {
            return Err(AutomationError::Missing("找不到 powershell.exe".to_string()));
        }
        Ok(())
    }

    fn launch(&self, kind: BackendKind) -> Result<Box<dyn ApplicationSession>, AutomationError> {
        if *self.0.automation_missing.lock().unwrap() {
            return Err(AutomationError::Missing("找不到 powershell.exe".to_string()));
        }
        if !self.0.installed.lock().unwrap().contains(&kind) {
            return Err(AutomationError::Failed(format!(
                "Retrieving the COM class factory for component {} failed: 80040154 Class not registered",
                kind.prog_id()
            )));
        }
        self.0.launches.lock().unwrap().push(kind);
        Ok(Box::new(FakeSession { office: self.0.clone(), document: None }))
    }
}

pub fn write_files(root: &Path, names: &[&str]) {
    for name in names {
        let path = root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"doc").unwrap();
    }
}
