pub mod broadcast_panel_channel;
pub mod config_service;
pub mod http_generation_service;
pub mod http_user_info_service;
pub mod paths;
pub mod storage;

pub use crate::broadcast_panel_channel::BroadcastPanelChannel;
pub use crate::config_service::ConfigService;
pub use crate::http_generation_service::HttpGenerationService;
pub use crate::http_user_info_service::HttpUserInfoService;
pub use crate::paths::RoasterPaths;
pub use crate::storage::{FileStorageRepository, InMemoryStorageRepository};
