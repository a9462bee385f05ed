pub mod task;
pub mod unit;
pub mod user;
pub mod config;

pub use task::*;
pub use unit::*;
pub use user::*;
pub use config::*;
