pub mod error;

pub mod models {
    pub mod backend;
    pub mod conversion;
    pub mod run;
}

pub mod service {
    pub mod classify;
    pub mod config_service;
    pub mod file;
    pub mod probe;
    pub mod traits {
        pub mod i_service;
    }
}

pub mod backend {
    pub mod adapter;
    pub mod automation;
    pub mod powershell;
    pub mod word;
    pub mod wps;
}

pub mod facade {
    pub mod control;
    pub mod orchestrator;
}

pub mod config {
    pub mod config;
    pub mod ports;
}

pub mod action {
    pub mod cli;
    pub mod interactive;
}

pub mod utils {
    pub mod convert;
    pub mod utils;
}
