use std::io;

use crate::config::ports::{AppConfig, ConfigPort};
use crate::models::backend::SelectionPolicy;
use crate::models::conversion::DEFAULT_EXTENSIONS;

// 配置服務，負責選擇適當的配置適配器
pub struct ConfigService {
    config_port: Box<dyn ConfigPort>,
}

impl ConfigService {
    pub fn new(config_port: Box<dyn ConfigPort>) -> Self {
        ConfigService { config_port }
    }

    pub fn get_config(&self) -> io::Result<AppConfig> {
        self.config_port.get_config()
    }
}

// 預設配置適配器：自動選擇後端，轉換 .doc 與 .docx
pub struct DefaultConfigAdapter {
    input: String,
}

impl DefaultConfigAdapter {
    pub fn new(input: String) -> Self {
        DefaultConfigAdapter { input }
    }
}

impl ConfigPort for DefaultConfigAdapter {
    fn get_config(&self) -> io::Result<AppConfig> {
        crate::config::config::validate_input_path(&self.input)?;
        Ok(AppConfig {
            input: self.input.clone(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            policy: SelectionPolicy::Auto,
            no_progress: false,
            check_only: false,
        })
    }
}
