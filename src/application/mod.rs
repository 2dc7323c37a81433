pub mod use_cases;

pub use use_cases::column_headings::ColumnHeadingResolver;
pub use use_cases::datasource_service::DataSourceService;
pub use use_cases::preview::PreviewMaterializer;
pub use use_cases::selection_service::SelectionService;
