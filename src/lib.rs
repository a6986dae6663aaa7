pub mod catalog;
pub mod commands;
pub mod download;
pub mod error;
pub mod http;
pub mod index;
pub mod removal;
pub mod resolver;
pub mod runtime;
