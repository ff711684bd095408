pub mod types;
pub use types::{InMemoryWizardRepository, StoredWizard, WizardRepository};
