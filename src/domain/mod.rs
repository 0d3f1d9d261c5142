pub mod ai;
pub mod entity;
pub mod rules;
pub mod tile;
