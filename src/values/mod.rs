//! Values sub-scorer: archetype mapping and continuum scoring.

pub mod classify;
pub mod scorer;
