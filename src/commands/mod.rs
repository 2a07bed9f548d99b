//! Command implementations

pub mod backup;
pub mod ident;
