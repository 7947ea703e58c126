//! # Compile Options
//!
//! Configuration surface of schema compilation. Options are plain serde
//! structs with defaults so they can be embedded in a host application's
//! own configuration.

use serde::{Deserialize, Serialize};

/// How the builder tracks records on the active expansion path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleTracking {
    /// A record stays "seen" for the rest of the compilation. A record
    /// reached through two sibling branches is emitted once and referenced
    /// from the second branch as a shared definition.
    #[default]
    Shared,
    /// A record is "seen" only while its own fields are being built. Only
    /// true cycles become recursive definitions.
    Scoped,
}

/// What a record does with input keys that are not declared fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraFields {
    /// Undeclared keys are violations.
    #[default]
    Forbid,
    /// Undeclared keys are dropped.
    Ignore,
}

/// Options for one compilation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    pub cycle_tracking: CycleTracking,
    pub extra_fields: ExtraFields,
}

impl CompileOptions {
    pub fn with_cycle_tracking(mut self, cycle_tracking: CycleTracking) -> Self {
        self.cycle_tracking = cycle_tracking;
        self
    }

    pub fn with_extra_fields(mut self, extra_fields: ExtraFields) -> Self {
        self.extra_fields = extra_fields;
        self
    }
}
