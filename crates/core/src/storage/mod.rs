pub mod format;
pub mod loader;
pub mod spreadsheet;
