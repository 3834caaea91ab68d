// Adapters layer: concrete implementations for external systems (filesystem, PDF, OCR tools).

pub mod ocr;
pub mod pdf;
pub mod storage;
