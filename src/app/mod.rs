mod chat;
pub mod dispatch;
