pub mod count_min;
pub mod doorkeeper;
pub mod frequency;
pub mod hash;
pub mod matrix;
