// src/document/mod.rs

//! The in-memory element tree watchers run against.
//!
//! Responsibilities:
//! - Store elements, text, attributes, and inline styles (`tree.rs`).
//! - Compile and match the supported CSS selector subset (`selector.rs`).
//!
//! [`Document`] is a cheap clonable handle; [`ElementRef`] points at one
//! element inside it and stays valid (but detached) after removal.

pub mod selector;
pub mod tree;

pub use selector::{Selector, SelectorError, SelectorErrorKind};
pub use tree::{Document, ElementRef};
