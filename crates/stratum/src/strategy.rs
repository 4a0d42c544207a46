//! Pluggable strategies deciding how classes, fields, versions and
//! discriminators are stored.
//!
//! Each family is a closed enum of built-in strategies plus a `Custom`
//! variant wrapping a trait object. Strategies receive the metadata node
//! they belong to as an argument; delegating strategies hold the superclass
//! they forward to.

pub mod class;

pub mod codec;

pub mod discriminator;

pub mod field;

pub mod lrs;

pub mod plan;

pub mod registry;
pub use registry::Registry;

pub mod version;

