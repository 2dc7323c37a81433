// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// CSV rendering of analyzed preview rows

mod preview_writer;

pub use preview_writer::CsvPreviewWriter;
