pub mod config;
pub mod db;
pub mod handler;
pub mod inference;
pub mod intake;
pub mod storage;
