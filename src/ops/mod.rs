pub mod board_ops;
pub mod columns;
pub mod drag;
pub mod filter;
