pub mod available_tables;
pub mod column_headings;
pub mod datasource_service;
pub mod flatten_options;
pub mod preview;
pub mod selection_service;

#[cfg(test)]
pub(crate) mod test_support;
