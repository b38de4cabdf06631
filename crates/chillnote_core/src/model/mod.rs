//! Domain model for the notes screen.
//!
//! # Responsibility
//! - Define the note record and the title-keyed collection persisted as one blob.
//! - Own title validation rules shared by every write path.
//!
//! # Invariants
//! - A note is identified by its title; titles are unique and never blank.
//! - Collection iteration order is insertion order.

pub mod note;
