use dialoguer::{Confirm, Input, Select};
use std::io;
use std::path::Path;

use crate::config::config::validate_extensions;
use crate::config::ports::{AppConfig, ConfigPort, ConversionPort};
use crate::models::backend::{BackendKind, SelectionPolicy};
use crate::models::run::BatchRun;
use crate::service::config_service::{ConfigService, DefaultConfigAdapter};
use crate::utils::convert::ConversionAdapter;
use crate::utils::utils::setup_logging;

pub fn process_interactive_mode() -> io::Result<Option<BatchRun>> {
    setup_logging("warn")?;
    println!("=== Word 轉 PDF 工具：互動模式 ===");
    let input = get_input_path()?;
    let use_default_config = get_default_config_option()?;

    let config_port: Box<dyn ConfigPort> = if use_default_config {
        println!("使用預設配置：自動選擇轉換方式，轉換 .doc 與 .docx");
        Box::new(DefaultConfigAdapter::new(input))
    } else {
        Box::new(InteractiveConfigAdapter::new(input))
    };
    let config = ConfigService::new(config_port).get_config()?;

    if !confirm_start()? {
        println!("已取消");
        return Ok(None);
    }

    let conversion_port: Box<dyn ConversionPort> = Box::new(ConversionAdapter::default());
    conversion_port.execute(config)
}

pub fn get_input_path() -> io::Result<String> {
    Input::new()
        .with_prompt("請輸入包含 Word 文件的資料夾路徑（例如：./docs）")
        .validate_with(|input: &String| -> Result<(), String> {
            if Path::new(input).is_dir() { Ok(()) } else { Err(format!("資料夾 '{}' 不存在", input)) }
        })
        .interact_text()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}

pub fn get_default_config_option() -> io::Result<bool> {
    Confirm::new()
        .with_prompt("是否使用預設配置？（自動選擇 Word 或 WPS，轉換 .doc 與 .docx）")
        .default(true)
        .interact()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("預設配置選擇失敗: {}", e)))
}

pub fn get_selection_policy() -> io::Result<SelectionPolicy> {
    let items = ["自動檢測（推薦）", "使用 Microsoft Word", "使用 WPS Office"];
    let choice = Select::new()
        .with_prompt("選擇轉換方式（使用方向鍵選擇，按 Enter 確認）")
        .items(&items)
        .default(0)
        .interact()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("轉換方式選擇失敗: {}", e)))?;
    Ok(match choice {
        1 => SelectionPolicy::Force(BackendKind::Word),
        2 => SelectionPolicy::Force(BackendKind::Wps),
        _ => SelectionPolicy::Auto,
    })
}

pub fn get_extensions() -> io::Result<Vec<String>> {
    let extensions = Input::new()
        .with_prompt("輸入要轉換的副檔名（以逗號分隔，預設為 doc,docx）")
        .default("doc,docx".to_string())
        .interact_text()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("副檔名輸入失敗: {}", e)))?
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<String>>();
    validate_extensions(&extensions)?;
    Ok(extensions)
}

pub fn confirm_start() -> io::Result<bool> {
    Confirm::new()
        .with_prompt("開始批次轉換？（轉換中按 Ctrl-C 可在目前檔案完成後停止）")
        .default(true)
        .interact()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("確認輸入失敗: {}", e)))
}

// 交互配置適配器
pub struct InteractiveConfigAdapter {
    input: String,
}

impl InteractiveConfigAdapter {
    pub fn new(input: String) -> Self {
        InteractiveConfigAdapter { input }
    }
}

impl ConfigPort for InteractiveConfigAdapter {
    fn get_config(&self) -> io::Result<AppConfig> {
        let policy = get_selection_policy()?;
        let extensions = get_extensions()?;

        Ok(AppConfig {
            input: self.input.clone(),
            extensions,
            policy,
            no_progress: false,
            check_only: false,
        })
    }
}
