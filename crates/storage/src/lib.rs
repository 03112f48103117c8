#![forbid(unsafe_code)]

pub mod query;
pub mod repository;
pub mod sqlite;
