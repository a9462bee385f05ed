pub mod config_io;
pub mod seed;
pub mod storage;
pub mod store;
pub mod workspace;
