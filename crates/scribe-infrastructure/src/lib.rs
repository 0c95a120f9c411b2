pub mod config_service;
pub mod dto;
pub mod local_fs;
pub mod paths;
pub mod recent_repository;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::local_fs::{AutoPrompt, LocalFileHost, PermissionLedger, PermissionPrompt};
pub use crate::paths::{PathError, ScribePaths};
pub use crate::recent_repository::KvRecentFilesRepository;
