pub mod viewer;
pub mod headless;
