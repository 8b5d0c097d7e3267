pub mod repositories;
pub mod sessions;
