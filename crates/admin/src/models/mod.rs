//! Domain models for the admin service.

pub mod deal;
pub mod import_profile;
pub mod product;

pub use deal::PendingDeal;
pub use import_profile::{CreateImportProfileInput, ImportProfile, ImportRun};
pub use product::CandidateProduct;
