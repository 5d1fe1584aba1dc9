pub mod audit;
pub mod children;
pub mod generate;
pub mod presets;
