//! # Placeholder Scanning
//!
//! Cursor-based tokenizer for `@key` placeholders.
//!
//! ## Modules
//!
//! - **`types`**: `PlaceholderMatch` and the grammar's delimiters
//! - **`cursor`**: `Cursor` for byte-by-byte scanning with position tracking
//! - **`scanner`**: `scan()` main entry point
//!
//! ## Coordinates
//!
//! Every offset is a byte offset into the scanned string. The grammar is
//! ASCII-only, so match boundaries always fall on char boundaries and the
//! substitution engine can slice and edit at them directly.

pub mod cursor;
pub mod scanner;
pub mod types;

pub use scanner::scan;
pub use types::{Placeholder, PlaceholderMatch};
