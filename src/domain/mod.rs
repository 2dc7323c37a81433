pub mod analyzed;
pub mod available_table;
pub mod datasource;
pub mod error;
pub mod flatten_options;
pub mod headings;
pub mod preview;
pub mod selection;
pub mod table;
