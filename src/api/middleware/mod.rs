//! Gateway middleware.

pub mod access;
