#![allow(dead_code)]

pub mod manifest;
pub mod source;

pub use manifest::*;
pub use source::*;
