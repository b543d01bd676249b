//! Core types and trait definitions for the habit tracker's data layer.
//!
//! This crate is deliberately free of database dependencies. Storage backends
//! (e.g. `habit-store-sqlite`) translate between these types and their own
//! row formats.

pub mod entity;
pub mod error;
pub mod insight;
pub mod migration;
pub mod record;
pub mod report;
pub mod stats;
pub mod sub_page;
pub mod trackable;
pub mod value;

pub use entity::Entity;
pub use error::{Error, Result};
pub use record::{NewRecord, Record};
pub use value::{FieldValue, Fields, Row};
