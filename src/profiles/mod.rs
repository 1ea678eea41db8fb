pub mod dto;
pub mod repo;
pub mod repo_types;

pub use repo_types::{Direction, Profile, SwipeDecision};
