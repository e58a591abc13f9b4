//! Presentation-facing read models.
//!
//! # Responsibility
//! - Project a snapshot into the lists a browser renders.
//! - Hold navigation state explicitly instead of in process globals.

pub mod navigation;
pub mod projection;
