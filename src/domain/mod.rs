//! Provider-independent repository model and tree construction.

pub mod entities;
pub mod value_objects;
