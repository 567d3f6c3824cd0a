// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The pipeline only needs two inputs: a caption table and a
// vector store. Where they come from is hidden behind these
// traits so the assembler never touches file formats.
//
// Implementations:
//   - TsvCaptionLoader  → CaptionSource (delimited text file)
//   - JsonVectorLoader  → VectorSource  (JSON object of arrays)
//   - In-memory tables and stores in tests

use crate::domain::caption::CaptionTable;
use crate::domain::image_vectors::ImageVectorStore;
use crate::error::Result;

// ─── CaptionSource ────────────────────────────────────────────────────────────
/// Any component that can produce the full caption table.
pub trait CaptionSource {
    fn load_all(&self) -> Result<CaptionTable>;
}

// ─── VectorSource ─────────────────────────────────────────────────────────────
/// Any component that can produce an image vector store.
pub trait VectorSource {
    fn load_all(&self) -> Result<ImageVectorStore>;
}

impl CaptionSource for CaptionTable {
    fn load_all(&self) -> Result<CaptionTable> {
        Ok(self.clone())
    }
}

impl VectorSource for ImageVectorStore {
    fn load_all(&self) -> Result<ImageVectorStore> {
        Ok(self.clone())
    }
}
