pub mod backend;
pub mod command;
pub mod config;
pub mod ctx;
pub mod dates;
pub mod db;
pub mod entity;
pub mod error;
pub mod usecase;
