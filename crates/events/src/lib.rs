//! Reactive wiring for the customer form.
//!
//! This crate connects the pure form model from `regform-core` to its
//! value-change subscriptions:
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`, carrying [`FormEvent`]s.
//! - [`debounce`] — a restartable quiet-period primitive for change bursts.
//! - [`FormController`] — owns the shared form, applies the synchronous
//!   notification toggle, and runs the debounced email message pipeline.

pub mod bus;
pub mod debounce;
pub mod wiring;

pub use bus::{EventBus, FormEvent, FormEventKind};
pub use wiring::{FormController, WiringConfig};
