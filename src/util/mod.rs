//! Utility modules

pub mod paths;

pub use paths::{
    absolute_path, config_path, data_dir, database_path, init_data_dir, log_file_path, logs_dir,
};
