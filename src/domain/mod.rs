pub mod capability;
pub mod models;
pub mod points;
pub mod scene;
pub mod session;
pub mod settings;
