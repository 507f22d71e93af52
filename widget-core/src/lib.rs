//! Widget Core - Domain Model and Error Taxonomy
//!
//! Defines the `Widget` entity (an immutable value keyed by the composite
//! `(tenant_key, key)` identity), its builder and partial-update patch, and
//! the error types shared by the store and API layers. This crate performs
//! no I/O and has no async surface.

pub mod error;
pub mod widget;

pub use error::{DriverError, StoreError, ValidationError, WidgetResult};
pub use widget::{Widget, WidgetBuilder, WidgetPatch};
