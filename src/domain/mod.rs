pub mod achievements;
pub mod difficulty;
pub mod language;
pub mod profile;
pub mod scoring;
