//! Text variables: `@placeholder` substitution for design documents.
//!
//! A text element shows resolved values while it is not being edited and
//! its `@key` placeholders while it is. [`engine`] does the two rewrites,
//! [`session`] decides when from selection changes, and [`dispatcher`]
//! ties selection and surface messages together.

pub mod debounce;
pub mod dispatcher;
pub mod engine;
pub mod host;
pub mod protocol;
pub mod scan;
pub mod session;
pub mod settings;
pub mod variables;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use dispatcher::{Dispatcher, Event};
pub use engine::{EngineError, Restoration, Substitution, restore, substitute};
pub use host::{ElementId, Font, HostError, MemoryDocument, TextHost};
pub use protocol::{Response, SettingsUpdate, UiMessage};
pub use session::{Session, Transition};
pub use settings::DocumentSettings;
pub use variables::{MemoryVariableStore, VariableStore, resolve};
