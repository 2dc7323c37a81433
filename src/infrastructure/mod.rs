pub mod bootstrap;
pub mod config;
pub mod csv;
pub mod headings_dictionary;
pub mod repository;
pub mod storage;
