pub mod captcha;
pub mod error;
pub mod notification_service;
pub mod quote_service;
pub mod settings_service;
