pub mod channels;
pub mod config;
pub mod read;
pub mod send;
