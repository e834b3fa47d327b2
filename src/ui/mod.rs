pub mod canvas;
pub mod panels;
pub mod plot;
