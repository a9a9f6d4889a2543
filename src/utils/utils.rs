use std::io;
use std::path::Path;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use pathdiff::diff_paths;

pub fn setup_logging(log_level: &str) -> io::Result<()> {
    let log_level_filter = match log_level {
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    };
    // 互動模式與 CLI 模式可能各自初始化，重複初始化時沿用第一次的設定
    let _ = env_logger::Builder::new()
        .filter_level(log_level_filter)
        .format_timestamp_secs()
        .try_init();
    Ok(())
}

pub struct ProgressManager {
    pb: ProgressBar,
    no_progress: bool,
    start: Instant,
}

impl ProgressManager {
    pub fn new(total: u64, no_progress: bool) -> Self {
        let pb = if no_progress {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(total);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{msg} [{bar:40}] {pos}/{len} ETA: {eta_precise}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("##-"),
            );
            pb
        };
        ProgressManager {
            pb,
            no_progress,
            start: Instant::now(),
        }
    }

    /// 開始處理第 index 個檔案（從 1 開始）
    pub fn begin(&self, index: usize, total: usize, file_name: &str) {
        if self.no_progress {
            return;
        }
        self.pb.set_message(format!("正在轉換 {}/{}：{}", index, total, file_name));
    }

    /// 一個檔案處理完畢，不論成功或失敗
    pub fn advance(&self) {
        if self.no_progress {
            return;
        }
        self.pb.inc(1);
    }

    pub fn println(&self, line: &str) {
        if self.no_progress {
            println!("{}", line);
        } else {
            self.pb.println(line);
        }
    }

    pub fn finish(&self, succeeded: usize, failed: usize, stopped: bool) {
        if self.no_progress {
            return;
        }
        let elapsed = self.start.elapsed().as_secs_f64();
        let status = if stopped { "已停止" } else { "完成" };
        self.pb.finish_with_message(format!(
            "轉換{}，成功 {} 個，失敗 {} 個，耗時 {:.1} 秒",
            status, succeeded, failed, elapsed
        ));
    }
}

pub fn create_progress_bar(total: u64, no_progress: bool) -> ProgressManager {
    ProgressManager::new(total, no_progress)
}

pub fn format_file_size(size: u64) -> String {
    if size < 1024 * 1024 {
        format!("{:.2} KB", size as f64 / 1024.0)
    } else {
        format!("{:.2} MB", size as f64 / (1024.0 * 1024.0))
    }
}

/// 相對於根目錄的顯示路徑，無法計算時使用完整路徑
pub fn display_relative(path: &Path, root: &Path) -> String {
    diff_paths(path, root)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|| path.display().to_string())
}
