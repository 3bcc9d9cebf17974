pub mod chat_controller;
pub mod history_controller;
pub mod session_controller;
