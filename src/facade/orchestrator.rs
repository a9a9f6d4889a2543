use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use log::{debug, error, info, warn};
use tokio::sync::mpsc::UnboundedSender;

use crate::backend::adapter::{AdapterProvider, AutomationAdapterProvider, BackendAdapter};
use crate::backend::automation::Automation;
use crate::error::ConvertError;
use crate::facade::control::RunControl;
use crate::models::backend::{BackendAvailability, BackendKind, SelectionPolicy};
use crate::models::conversion::{ConversionOutcome, ConversionTask, ExtensionSet, TaskRecord};
use crate::models::run::{BatchRun, RunEvent, RunState};
use crate::service::file::FileService;
use crate::service::probe::ProbeService;
use crate::service::traits::i_service::{FileServiceTrait, ProbeServiceTrait};
use crate::utils::utils::format_file_size;

pub type EventSender = UnboundedSender<RunEvent>;

/// 轉換協調器：掃描、探測、選擇後端、逐一轉換並彙總結果
pub struct ConversionOrchestrator {
    file_service: Box<dyn FileServiceTrait>,
    probe_service: Box<dyn ProbeServiceTrait>,
    adapters: Box<dyn AdapterProvider>,
    control: RunControl,
    root: Option<PathBuf>,
    policy: SelectionPolicy,
    tasks: Vec<ConversionTask>,
}

impl ConversionOrchestrator {
    pub fn new(
        file_service: Box<dyn FileServiceTrait>,
        probe_service: Box<dyn ProbeServiceTrait>,
        adapters: Box<dyn AdapterProvider>,
    ) -> Self {
        ConversionOrchestrator {
            file_service,
            probe_service,
            adapters,
            control: RunControl::new(),
            root: None,
            policy: SelectionPolicy::Auto,
            tasks: Vec::new(),
        }
    }

    /// 以同一個自動化層組裝探測服務與各後端轉接器
    pub fn with_automation(automation: Arc<dyn Automation>) -> Self {
        ConversionOrchestrator::new(
            Box::new(FileService::new()),
            Box::new(ProbeService::new(automation.clone())),
            Box::new(AutomationAdapterProvider::new(automation)),
        )
    }

    /// 給控制端使用的取消與狀態查詢介面
    pub fn control(&self) -> RunControl {
        self.control.clone()
    }

    pub fn state(&self) -> RunState {
        self.control.state()
    }

    pub fn tasks(&self) -> &[ConversionTask] {
        &self.tasks
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn request_cancel(&self) -> bool {
        self.control.request_cancel()
    }

    /// 設定根目錄、副檔名與選擇策略並掃描；回傳找到的檔案數
    pub fn configure(
        &mut self,
        root: &Path,
        extensions: &ExtensionSet,
        policy: SelectionPolicy,
    ) -> Result<usize, ConvertError> {
        if matches!(self.state(), RunState::Converting | RunState::Stopping) {
            return Err(ConvertError::NotReady("轉換進行中，無法重新設定".to_string()));
        }

        self.control.set_state(RunState::Scanning);
        self.policy = policy;
        let files = match self.file_service.discover(root, extensions) {
            Ok(files) => files,
            Err(e) => {
                self.root = None;
                self.tasks.clear();
                self.control.set_state(RunState::Idle);
                return Err(e);
            }
        };

        self.root = Some(root.to_path_buf());
        self.tasks = files.into_iter().map(ConversionTask::new).collect();
        if self.tasks.is_empty() {
            warn!("該資料夾中沒有找到符合的檔案：{}", root.display());
            self.control.set_state(RunState::NoFiles);
        } else {
            info!("✓ 掃描完成，找到 {} 個檔案", self.tasks.len());
            self.control.set_state(RunState::Ready);
        }
        Ok(self.tasks.len())
    }

    /// 檢查自動化層並重新探測所有後端
    pub fn check_environment(&self) -> Result<BackendAvailability, ConvertError> {
        info!("正在偵測 Office 應用程式...");
        self.probe_service.check_dependency()?;
        Ok(self.probe_service.probe(BackendKind::all()))
    }

    /// 執行一次批次；開始前的錯誤直接回傳，單一檔案的失敗只記錄在結果中
    pub fn start(&mut self, events: &EventSender) -> Result<BatchRun, ConvertError> {
        let state = self.state();
        if !state.can_start() {
            return Err(ConvertError::NotReady(format!("目前狀態為「{}」", state)));
        }
        if self.tasks.is_empty() {
            return Err(ConvertError::NotReady("沒有待轉換的檔案".to_string()));
        }
        if state.is_terminal() {
            self.control.set_state(RunState::Ready);
        }

        let availability = self.check_environment()?;
        let backend = self.policy.resolve(&availability)?;
        info!("轉換方式：{}（{}）", backend, self.policy);
        info!("✓ 環境檢測通過");

        Ok(self.run(backend, &availability, events))
    }

    fn run(&mut self, backend: BackendKind, availability: &BackendAvailability, events: &EventSender) -> BatchRun {
        self.control.begin_run();
        let started = Instant::now();
        let total = self.tasks.len();
        let mut run = BatchRun::new(backend, total);
        let mut adapters: BTreeMap<BackendKind, Box<dyn BackendAdapter>> = BTreeMap::new();

        info!("開始批次轉換，共 {} 個檔案", total);
        for (i, task) in self.tasks.iter().enumerate() {
            if self.control.is_cancel_requested() {
                warn!("轉換已被使用者停止");
                break;
            }

            let index = i + 1;
            let file_name = task.file_name();
            info!("[{}/{}] 正在轉換：{}", index, total, file_name);
            emit(events, RunEvent::Progress { index, total, file_name });

            // 可用性只在進入轉換時取得一次，不逐檔重新探測
            let kind = self.policy.resolve(availability).unwrap_or(backend);
            let adapter = adapters
                .entry(kind)
                .or_insert_with(|| self.adapters.adapter(kind));
            let outcome = convert_one(adapter.as_ref(), task);

            let record = TaskRecord { index, task: task.clone(), backend: kind, outcome };
            run.record(record.clone());
            emit(events, RunEvent::TaskOutcome(record));
        }

        run.state = self.control.finish_run();
        run.elapsed = started.elapsed();
        log_summary(&run);
        emit(events, RunEvent::RunComplete(run.clone()));
        run
    }
}

fn convert_one(adapter: &dyn BackendAdapter, task: &ConversionTask) -> ConversionOutcome {
    let started = Instant::now();
    match adapter.convert(task.source(), task.target()) {
        Ok(()) => {
            let elapsed = started.elapsed();
            let output_size = fs::metadata(task.target()).map(|m| m.len()).unwrap_or(0);
            info!(
                "  ✓ 轉換成功：{}，大小：{}，耗時：{:.2} 秒",
                task.target().display(),
                format_file_size(output_size),
                elapsed.as_secs_f64()
            );
            ConversionOutcome::Success {
                target: task.target().to_path_buf(),
                elapsed,
                output_size,
            }
        }
        Err(e) => {
            error!("  ✗ 轉換失敗：{}（{}）", task.file_name(), e.kind.describe());
            error!("     錯誤詳情：{}", e.message);
            e.into()
        }
    }
}

fn emit(events: &EventSender, event: RunEvent) {
    if events.send(event).is_err() {
        debug!("事件接收端已關閉，略過事件");
    }
}

fn log_summary(run: &BatchRun) {
    match run.state {
        RunState::Stopped => {
            info!("轉換已停止！已處理：{}/{} 個", run.processed(), run.total);
        }
        _ => info!("轉換完成！"),
    }
    info!("成功：{} 個，失敗：{} 個", run.succeeded, run.failed);
    if let Some(avg) = run.average_seconds() {
        info!("平均耗時：{:.2} 秒/檔案", avg);
    }
    for (i, name) in run.failed_files().iter().enumerate() {
        warn!("  失敗檔案 {}. {}", i + 1, name);
    }
}
