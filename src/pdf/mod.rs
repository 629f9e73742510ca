pub mod assembler;
pub mod image_xobject;
pub mod layout;
pub mod writer;

pub use assembler::{AssembledDocument, PageSummary, assemble};
