// src/pipeline/mod.rs

//! Pipeline stages, in run order: enrichment, recurrence expansion,
//! consequence mapping, situation assembly, validation.

mod affects;
mod enrich;
mod situation;
mod validate;
mod validity;

pub use affects::map_consequence;
pub use enrich::{enrich_disruptions, include_disruption};
pub use situation::build_situation;
pub use validate::{validate_document, validate_situation, validate_situations};
pub use validity::expand_validity;
