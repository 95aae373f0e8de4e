//! Build-time logical schema generation.
//!
//! Runs the schemarch extractors from `build.rs` and keeps a checked-in
//! `schema.logical.json` in sync with the annotated sources.
//!
//! # Example
//!
//! In your `build.rs`:
//!
//! ```ignore
//! fn main() {
//!     schemarch_build::generate_schema()
//!         .scan_root("src/")
//!         .openapi("openapi.json")
//!         .output_file("schema.logical.json")
//!         .run()
//!         .expect("Failed to generate logical schema");
//! }
//! ```

mod generator;

pub use generator::SchemaGenerator;

/// Create a new schema generator with default settings.
pub fn generate_schema() -> SchemaGenerator {
    SchemaGenerator::new()
}
