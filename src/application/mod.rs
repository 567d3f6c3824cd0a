// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Coordinates the data and infra layers to run a complete
// preparation job. No dataset logic lives here.

// Configuration and the end-to-end preparation workflow
pub mod prepare_use_case;
