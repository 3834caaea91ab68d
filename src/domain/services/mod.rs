// Pure logic behind each stage; no I/O here.

pub mod analysis;
pub mod ingredients;
pub mod report;
