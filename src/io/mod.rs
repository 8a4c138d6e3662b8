pub mod board_store;
pub mod config_io;
pub mod migrate;
pub mod paths;
pub mod recovery;
pub mod state;
pub mod store;
