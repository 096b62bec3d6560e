//! Exclusionary clauses in certificate/policy text, and their collisions
//! with the project and the program's requirements.

pub mod patterns;
pub mod scanner;
pub mod conflicts;

pub use patterns::{without_negations, ExclusionPattern, EXCLUSION_PATTERNS};
pub use scanner::*;
pub use conflicts::*;
