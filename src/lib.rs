pub mod driver;
pub mod eval;
