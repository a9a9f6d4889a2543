use std::sync::{Arc, Mutex, MutexGuard};

use log::info;

use crate::models::run::RunState;

#[derive(Debug, Default)]
struct ControlState {
    state: RunState,
    cancel_requested: bool,
}

/// 控制端與工作執行緒之間唯一共享的狀態：執行狀態與取消旗標，由同一把鎖保護
#[derive(Debug, Clone, Default)]
pub struct RunControl {
    inner: Arc<Mutex<ControlState>>,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// 要求停止；只有在轉換中才生效，目前的檔案會先完成
    pub fn request_cancel(&self) -> bool {
        let mut inner = self.lock();
        if inner.state != RunState::Converting {
            return false;
        }
        inner.cancel_requested = true;
        inner.state = RunState::Stopping;
        info!("使用者請求停止轉換，將在目前檔案完成後停止");
        true
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.lock().cancel_requested
    }

    pub fn state(&self) -> RunState {
        self.lock().state
    }

    pub(crate) fn set_state(&self, state: RunState) {
        self.lock().state = state;
    }

    /// 進入轉換狀態並清除上一次的取消要求
    pub(crate) fn begin_run(&self) {
        let mut inner = self.lock();
        inner.cancel_requested = false;
        inner.state = RunState::Converting;
    }

    /// 結束本次執行並回傳最終狀態
    pub(crate) fn finish_run(&self) -> RunState {
        let mut inner = self.lock();
        inner.state = if inner.cancel_requested {
            RunState::Stopped
        } else {
            RunState::Completed
        };
        inner.cancel_requested = false;
        inner.state
    }

    fn lock(&self) -> MutexGuard<'_, ControlState> {
        // 鎖內只有純資料，中毒時沿用內部狀態
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_noop_outside_converting() {
        let control = RunControl::new();
        control.set_state(RunState::Ready);
        assert!(!control.request_cancel());
        assert!(!control.is_cancel_requested());
        assert_eq!(control.state(), RunState::Ready);
    }

    #[test]
    fn cancel_during_run_ends_stopped() {
        let control = RunControl::new();
        control.begin_run();
        let handle = control.clone();
        assert!(handle.request_cancel());
        assert_eq!(control.state(), RunState::Stopping);
        assert_eq!(control.finish_run(), RunState::Stopped);
        assert!(!control.is_cancel_requested());
    }

    #[test]
    fn uncancelled_run_completes() {
        let control = RunControl::new();
        control.begin_run();
        assert_eq!(control.finish_run(), RunState::Completed);
    }
}
