//! Core definitions (traits and common data structures), relied upon by all dynpack-* crates.

pub mod approach;
pub mod binary;
pub mod error;
pub mod macros;
pub mod result;
pub mod value;

pub use result::Result;
