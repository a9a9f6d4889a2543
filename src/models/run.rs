use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::models::backend::BackendKind;
use crate::models::conversion::{ConversionOutcome, TaskRecord};

/// 協調器狀態：Idle → Scanning → Ready → Converting → {Stopping → Stopped, Completed}
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Scanning,
    Ready,
    /// 目錄中沒有符合的檔案
    NoFiles,
    Converting,
    Stopping,
    Stopped,
    Completed,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Stopped | RunState::Completed)
    }

    /// 可以開始（或重新開始）一次批次的狀態
    pub fn can_start(&self) -> bool {
        matches!(self, RunState::Ready | RunState::Stopped | RunState::Completed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RunState::Idle => "等待選擇目錄",
            RunState::Scanning => "掃描中",
            RunState::Ready => "就緒",
            RunState::NoFiles => "未找到檔案",
            RunState::Converting => "轉換中",
            RunState::Stopping => "正在停止",
            RunState::Stopped => "已停止",
            RunState::Completed => "已完成",
        };
        f.write_str(text)
    }
}

/// 單次批次的彙總，由協調器在執行期間獨佔
#[derive(Debug, Clone)]
pub struct BatchRun {
    pub backend: BackendKind,
    pub started_at: DateTime<Local>,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub records: Vec<TaskRecord>,
    pub state: RunState,
    pub elapsed: Duration,
}

impl BatchRun {
    pub fn new(backend: BackendKind, total: usize) -> Self {
        BatchRun {
            backend,
            started_at: Local::now(),
            total,
            succeeded: 0,
            failed: 0,
            records: Vec::with_capacity(total),
            state: RunState::Converting,
            elapsed: Duration::ZERO,
        }
    }

    pub fn record(&mut self, record: TaskRecord) {
        if record.outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.records.push(record);
    }

    pub fn processed(&self) -> usize {
        self.records.len()
    }

    pub fn failed_files(&self) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| !r.outcome.is_success())
            .map(|r| r.task.file_name())
            .collect()
    }

    /// 成功檔案的平均耗時（秒）
    pub fn average_seconds(&self) -> Option<f64> {
        if self.succeeded == 0 {
            return None;
        }
        let total: f64 = self
            .records
            .iter()
            .filter_map(|r| match &r.outcome {
                ConversionOutcome::Success { elapsed, .. } => Some(elapsed.as_secs_f64()),
                ConversionOutcome::Failure { .. } => None,
            })
            .sum();
        Some(total / self.succeeded as f64)
    }
}

/// 協調器送往控制端的事件
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// index 從 1 開始
    Progress {
        index: usize,
        total: usize,
        file_name: String,
    },
    TaskOutcome(TaskRecord),
    RunComplete(BatchRun),
}
