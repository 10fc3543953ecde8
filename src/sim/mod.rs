pub mod app;
pub mod daily;
pub mod event;
pub mod round;
pub mod save;
pub mod session;
pub mod words;
