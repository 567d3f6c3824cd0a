// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits describing the inputs of the
// pipeline. No file formats, no tokenisation, no randomness.

/// Caption rows and the table that holds them
pub mod caption;

/// Identifier → feature vector mapping
pub mod image_vectors;

/// Source abstractions implemented by the loaders
pub mod traits;
