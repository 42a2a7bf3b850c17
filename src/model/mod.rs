pub mod config;
pub mod effect;
pub mod mesh;
pub mod parameter;
pub mod property;
pub mod registry;
pub mod stage;
