//! Relayed event data model.
//!
//! ## Contents
//! - [`EventClass`] bit-flag category; `0` is the "any class" filter
//! - [`Event`] immutable `{class, payload}` pair
//!
//! Wire-level shape, for documentation and tests:
//! `{ class: integer (1 = round-start, 2 = answer-received, next power of two for new classes), payload: bytes }`.

mod class;
mod event;

pub use class::EventClass;
pub use event::Event;
