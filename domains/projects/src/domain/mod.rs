//! Domain layer for Projects: entities, invariants, and state machines

pub mod entities;
pub mod guard;
pub mod state;
pub mod validation;
