//! # xwalk-crosswalk — Controls and the Crosswalk Store
//!
//! The N:N junction between an organization's internal controls and the
//! versioned requirement library:
//!
//! - [`Control`]: an internal implementation unit, independent of any
//!   framework.
//! - [`CrosswalkMapping`]: one control linked to one requirement within
//!   one specific framework version, carrying coverage and strength.
//! - [`MappingStore`]: the mapping collection with create/supersede/remove
//!   semantics. Mapping drift status is mutated only by the drift engine.
//! - Collaborator contracts ([`ControlDirectory`], [`AnswerSource`]):
//!   the engine consumes these, it does not implement the organization's
//!   control inventory or questionnaire storage.

pub mod collaborators;
pub mod control;
pub mod mapping;

pub use collaborators::{
    AnswerSource, ControlDirectory, InMemoryAnswerSource, InMemoryControlDirectory,
};
pub use control::Control;
pub use mapping::{CrosswalkMapping, MappingStore, NewMapping};
