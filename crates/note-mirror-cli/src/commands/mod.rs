pub mod download;
pub mod find;
pub mod info;
pub mod list;
