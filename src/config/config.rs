use clap::Parser;
use std::io;
use std::path::Path;

#[derive(Parser, Clone, Debug)]
#[command(
    name = "office_to_pdf",
    about = "批次將 Word 文件轉換為 PDF",
    long_about = "一個透過 Microsoft Word 或 WPS Office 自動化介面，將目錄（含子目錄）中的 Word 文件批次轉換為 PDF 的工具。\nPDF 檔案會輸出在原始文件旁邊。不帶任何參數執行時進入互動模式。\n使用 `--help` 查看詳細用法。",
    arg_required_else_help = true
)]
pub struct Cli {
    /// 包含 Word 文件的資料夾
    pub input: String,
    /// 要轉換的副檔名，以逗號分隔
    #[arg(long, default_values = ["doc", "docx"], value_delimiter = ',')]
    pub ext: Vec<String>,
    /// 轉換方式：auto 會優先使用 Word，其次 WPS
    #[arg(long, default_value = "auto", value_parser = ["auto", "word", "wps"])]
    pub backend: String,
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
    /// 只檢測轉換環境，不進行轉換
    #[arg(long, default_value_t = false)]
    pub check: bool,
    #[arg(long, default_value = "info", value_parser = ["debug", "info", "warn", "error"])]
    pub log_level: String,
}

pub fn validate_input_path(input: &str) -> io::Result<&Path> {
    let path = Path::new(input);
    if !path.is_dir() {
        log::error!("輸入路徑不存在或不是目錄：{}", input);
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("輸入路徑 '{}' 不存在或不是目錄", input),
        ));
    }
    Ok(path)
}

pub fn is_valid_extension(ext: &str) -> bool {
    let invalid_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
    let ext = ext.trim().trim_start_matches('.');
    !ext.is_empty() && !ext.contains(&invalid_chars[..])
}

pub fn validate_extensions(extensions: &[String]) -> io::Result<()> {
    if extensions.is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "至少需要一個副檔名"));
    }
    for ext in extensions {
        if !is_valid_extension(ext) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("無效的副檔名: {}", ext),
            ));
        }
    }
    Ok(())
}
