//! Utility modules

pub mod codes;
pub mod paths;

pub use codes::{generate_code, generate_code_with, is_valid_code, normalize_code, CODE_LENGTH};
pub use paths::{config_path, data_dir, init_data_dir, log_file_path, logs_dir};
