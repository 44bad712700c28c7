pub mod device;
pub mod export;
pub mod logging;
pub mod service;
