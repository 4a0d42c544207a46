//! Mapping strategies of an object-relational persistence layer.
//!
//! Classes, fields, versions and discriminators are described by metadata
//! nodes in [`mapping`], each carrying the [`strategy`] deciding how it is
//! stored. A [`Repository`] owns the metadata and maps it onto tables once;
//! afterwards [`flush`] and [`load`] move managed instances to and from rows.

pub mod flush;

pub mod load;

pub mod mapping;
pub use mapping::{ClassMapping, FieldMapping, Repository, ValueMapping};

pub mod strategy;

pub use stratum_core::{Error, Result};
