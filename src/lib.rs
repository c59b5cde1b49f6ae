pub mod astro;
pub mod error;
pub mod file;
pub mod math;
pub mod model;

#[cfg(test)]
pub mod consts;
