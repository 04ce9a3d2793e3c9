//! HTTP handlers for the Projects domain

pub mod places;
pub mod projects;
