pub mod admin;
pub mod canvas;
pub mod input;
pub mod nixie;
pub mod render;
