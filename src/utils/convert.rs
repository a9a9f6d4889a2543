use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;
use tokio::sync::mpsc::unbounded_channel;

use crate::backend::automation::Automation;
use crate::backend::powershell::PowerShellAutomation;
use crate::config::ports::{AppConfig, ConversionPort};
use crate::facade::control::RunControl;
use crate::facade::orchestrator::ConversionOrchestrator;
use crate::models::backend::SelectionPolicy;
use crate::models::conversion::{ConversionOutcome, ConversionTask, ExtensionSet};
use crate::models::run::{BatchRun, RunEvent, RunState};
use crate::utils::utils::{create_progress_bar, display_relative};

const PREVIEW_COUNT: usize = 5;

// 轉換執行適配器：組裝協調器，在工作執行緒上執行批次並於前景呈現進度
pub struct ConversionAdapter {
    automation: Arc<dyn Automation>,
}

impl ConversionAdapter {
    pub fn new(automation: Arc<dyn Automation>) -> Self {
        ConversionAdapter { automation }
    }
}

impl Default for ConversionAdapter {
    fn default() -> Self {
        ConversionAdapter::new(Arc::new(PowerShellAutomation::default()))
    }
}

impl ConversionPort for ConversionAdapter {
    fn execute(&self, config: AppConfig) -> io::Result<Option<BatchRun>> {
        let mut orchestrator = ConversionOrchestrator::with_automation(self.automation.clone());

        if config.check_only {
            report_environment(&orchestrator, config.policy)?;
            return Ok(None);
        }

        let root = Path::new(&config.input);
        let extensions = ExtensionSet::new(&config.extensions);
        let count = orchestrator.configure(root, &extensions, config.policy)?;
        report_scan(orchestrator.tasks(), root);
        if count == 0 {
            return Ok(None);
        }

        println!("\n檢測轉換環境...");
        let run = run_batch(orchestrator, config.no_progress)?;
        print_summary(&run);
        Ok(Some(run))
    }
}

fn report_environment(orchestrator: &ConversionOrchestrator, policy: SelectionPolicy) -> io::Result<()> {
    println!("檢測轉換環境...");
    let availability = orchestrator.check_environment()?;
    println!("  - 自動化元件: ✓ 可用");
    for (kind, available) in availability.iter() {
        println!("  - {}: {}", kind, if available { "✓ 已安裝" } else { "✗ 未偵測到" });
    }
    let backend = policy.resolve(&availability)?;
    println!("\n轉換方式: {}（{}）", backend, policy);
    println!("✓ 環境檢測通過");
    Ok(())
}

fn report_scan(tasks: &[ConversionTask], root: &Path) {
    if tasks.is_empty() {
        println!("⚠ 該資料夾中沒有找到 Word 文件");
        return;
    }
    println!("✓ 掃描完成，找到 {} 個 Word 文件", tasks.len());
    for (i, task) in tasks.iter().take(PREVIEW_COUNT).enumerate() {
        println!("  {}. {}", i + 1, display_relative(task.source(), root));
    }
    if tasks.len() > PREVIEW_COUNT {
        println!("  ... 還有 {} 個檔案", tasks.len() - PREVIEW_COUNT);
    }
}

fn run_batch(orchestrator: ConversionOrchestrator, no_progress: bool) -> io::Result<BatchRun> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;
    runtime.block_on(drive(orchestrator, no_progress))
}

/// 工作執行緒執行協調器迴圈；前景接收事件並在 Ctrl-C 時要求停止
async fn drive(mut orchestrator: ConversionOrchestrator, no_progress: bool) -> io::Result<BatchRun> {
    let control = orchestrator.control();
    let total = orchestrator.tasks().len();
    let root: PathBuf = orchestrator.root().map(Path::to_path_buf).unwrap_or_default();
    let (tx, mut rx) = unbounded_channel();
    let worker = tokio::task::spawn_blocking(move || orchestrator.start(&tx));

    let pm = create_progress_bar(total as u64, no_progress);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut relay = CancelRelay::default();

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(RunEvent::Progress { index, total, file_name }) => {
                    if relay.on_converting(&control) {
                        pm.println("⚠ 已送出停止請求，目前檔案完成後停止...");
                    }
                    pm.begin(index, total, &file_name);
                }
                Some(RunEvent::TaskOutcome(record)) => {
                    pm.advance();
                    if let ConversionOutcome::Failure { kind, .. } = &record.outcome {
                        pm.println(&format!(
                            "  ✗ {}：{}",
                            display_relative(record.task.source(), &root),
                            kind.describe()
                        ));
                    }
                }
                Some(RunEvent::RunComplete(run)) => {
                    pm.finish(run.succeeded, run.failed, run.state == RunState::Stopped);
                }
                None => break,
            },
            signal = &mut ctrl_c => {
                ctrl_c.set(tokio::signal::ctrl_c());
                if signal.is_err() {
                    continue;
                }
                match relay.on_signal(&control) {
                    CancelNotice::Accepted => pm.println("⚠ 使用者請求停止轉換，目前檔案完成後停止..."),
                    CancelNotice::Deferred => pm.println("⚠ 使用者請求停止轉換，將在轉換開始後停止..."),
                    CancelNotice::AlreadyStopping => pm.println("⚠ 正在停止，請等待目前檔案完成..."),
                }
            }
        }
    }

    let result = worker
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("轉換工作執行緒異常：{}", e)))?;
    Ok(result?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CancelNotice {
    Accepted,
    Deferred,
    AlreadyStopping,
}

/// 轉換開始前（例如探測後端期間）收到的 Ctrl-C 先保留，進入轉換後再送出
#[derive(Debug, Default)]
struct CancelRelay {
    pending: bool,
    sent: bool,
}

impl CancelRelay {
    fn on_signal(&mut self, control: &RunControl) -> CancelNotice {
        if self.sent {
            return CancelNotice::AlreadyStopping;
        }
        if control.request_cancel() {
            self.sent = true;
            self.pending = false;
            CancelNotice::Accepted
        } else {
            self.pending = true;
            CancelNotice::Deferred
        }
    }

    /// 收到轉換事件時送出保留中的停止請求；有送出時回傳 true
    fn on_converting(&mut self, control: &RunControl) -> bool {
        if !self.pending || self.sent {
            return false;
        }
        if control.request_cancel() {
            self.sent = true;
            self.pending = false;
            return true;
        }
        false
    }
}

fn print_summary(run: &BatchRun) {
    println!("\n{}", "=".repeat(60));
    if run.state == RunState::Stopped {
        println!("轉換已停止！");
        println!("已處理: {}/{} 個", run.processed(), run.total);
    } else {
        println!("轉換完成！");
    }
    println!("轉換方式: {}", run.backend);
    println!("成功: {} 個，失敗: {} 個", run.succeeded, run.failed);
    if let Some(avg) = run.average_seconds() {
        println!("平均耗時: {:.2} 秒/檔案", avg);
    }

    let failed = run.failed_files();
    if !failed.is_empty() {
        println!("\n失敗檔案列表:");
        for (i, name) in failed.iter().enumerate() {
            println!("  {}. {}", i + 1, name);
        }
        println!("\n建議: 請手動用 {} 開啟上述檔案檢查是否有錯誤", run.backend);
    }
    println!("{}", "=".repeat(60));
    info!(
        "批次結束（{}），開始於 {}，總耗時 {:.1} 秒",
        run.state,
        run.started_at.format("%Y-%m-%d %H:%M:%S"),
        run.elapsed.as_secs_f64()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_before_conversion_is_kept_until_run_begins() {
        let control = RunControl::new();
        control.set_state(RunState::Ready);
        let mut relay = CancelRelay::default();

        assert_eq!(relay.on_signal(&control), CancelNotice::Deferred);
        assert!(!control.is_cancel_requested());

        control.begin_run();
        assert!(relay.on_converting(&control));
        assert!(control.is_cancel_requested());
        assert_eq!(control.state(), RunState::Stopping);
        assert!(!relay.on_converting(&control));
    }

    #[test]
    fn signal_during_conversion_is_sent_once() {
        let control = RunControl::new();
        control.begin_run();
        let mut relay = CancelRelay::default();

        assert_eq!(relay.on_signal(&control), CancelNotice::Accepted);
        assert_eq!(relay.on_signal(&control), CancelNotice::AlreadyStopping);
        assert!(!relay.on_converting(&control));
        assert_eq!(control.finish_run(), RunState::Stopped);
    }

    #[test]
    fn no_signal_leaves_run_alone() {
        let control = RunControl::new();
        control.begin_run();
        let mut relay = CancelRelay::default();

        assert!(!relay.on_converting(&control));
        assert_eq!(control.finish_run(), RunState::Completed);
    }
}
