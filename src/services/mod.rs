pub mod message_service;
pub mod push;
pub mod push_client;
pub mod relay;
pub mod session_service;
pub mod subscription_service;
pub mod upload_service;
pub mod user_service;
