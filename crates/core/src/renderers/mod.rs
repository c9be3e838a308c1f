pub mod traits;

// Output formats
pub mod html;
pub mod vega_lite;
