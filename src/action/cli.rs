use std::io;

use clap::Parser;

use crate::action::interactive::process_interactive_mode;
use crate::config::config::{validate_extensions, validate_input_path, Cli};
use crate::config::ports::{AppConfig, ConfigPort, ConversionPort};
use crate::models::backend::SelectionPolicy;
use crate::models::run::BatchRun;
use crate::service::config_service::ConfigService;
use crate::utils::convert::ConversionAdapter;
use crate::utils::utils::setup_logging;

pub fn process_args(args: Vec<String>) -> io::Result<Option<BatchRun>> {
    if args.len() == 1 {
        process_interactive_mode()
    } else {
        process_cli_mode()
    }
}

pub fn process_cli_mode() -> io::Result<Option<BatchRun>> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level)?;

    let config_service = ConfigService::new(Box::new(CliConfigAdapter::new(cli)));
    let config = config_service.get_config()?;
    log::info!(
        "開始批次轉換，輸入路徑：{}，副檔名：{:?}，轉換方式：{}",
        config.input,
        config.extensions,
        config.policy
    );

    let conversion_port: Box<dyn ConversionPort> = Box::new(ConversionAdapter::default());
    conversion_port.execute(config)
}

// CLI 配置適配器
pub struct CliConfigAdapter {
    cli: Cli,
}

impl CliConfigAdapter {
    pub fn new(cli: Cli) -> Self {
        CliConfigAdapter { cli }
    }
}

impl ConfigPort for CliConfigAdapter {
    fn get_config(&self) -> io::Result<AppConfig> {
        validate_input_path(&self.cli.input)?;
        validate_extensions(&self.cli.ext)?;
        let policy = SelectionPolicy::parse(&self.cli.backend).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("無效的轉換方式: {}", self.cli.backend),
            )
        })?;

        Ok(AppConfig {
            input: self.cli.input.clone(),
            extensions: self.cli.ext.clone(),
            policy,
            no_progress: self.cli.no_progress,
            check_only: self.cli.check,
        })
    }
}
