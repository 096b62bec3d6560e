pub mod extraction;
pub mod requirements;
pub mod compliance;
pub mod exclusions;
pub mod render;
pub mod sink;
pub mod processor; // decode → extract → evaluate → render → store
