use std::path::{Path, PathBuf};

use crate::error::ConvertError;
use crate::models::backend::{BackendAvailability, BackendKind};
use crate::models::conversion::ExtensionSet;

// File 服務接口，負責掃描待轉換檔案
pub trait FileServiceTrait: Send + Sync {
    /// 遞迴掃描 root，回傳副檔名（不分大小寫）符合的檔案
    /// # 參數
    /// - root: 掃描的根目錄
    /// - extensions: 接受的副檔名集合
    /// # 回傳
    /// - 成功時返回依走訪順序排列的檔案；root 不存在或不是目錄時返回 PathNotFound
    fn discover(&self, root: &Path, extensions: &ExtensionSet) -> Result<Vec<PathBuf>, ConvertError>;
}

// Probe 服務接口，負責偵測可用的後端
pub trait ProbeServiceTrait: Send + Sync {
    /// 確認自動化層本身存在
    fn check_dependency(&self) -> Result<(), ConvertError>;

    /// 逐一嘗試啟動並立即結束每種後端，單一後端失敗不影響其他後端
    fn probe(&self, kinds: &[BackendKind]) -> BackendAvailability;
}
