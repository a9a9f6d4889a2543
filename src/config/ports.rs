use std::io;

use crate::models::backend::SelectionPolicy;
use crate::models::run::BatchRun;

// 應用配置結構體，封裝所有參數
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub input: String,
    pub extensions: Vec<String>,
    pub policy: SelectionPolicy,
    pub no_progress: bool,
    pub check_only: bool,
}

// 配置來源的 Port
pub trait ConfigPort {
    fn get_config(&self) -> io::Result<AppConfig>;
}

// 轉換執行的 Port；未實際執行批次（僅檢測環境或沒有檔案）時回傳 None
pub trait ConversionPort {
    fn execute(&self, config: AppConfig) -> io::Result<Option<BatchRun>>;
}
