pub mod activity;
pub mod notification;
