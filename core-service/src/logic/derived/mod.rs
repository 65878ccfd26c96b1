//! Derived physical quantities
//!
//! Closed-form approximations computed from raw (unscaled) inputs. Pure
//! functions: they never touch model state, and negative distances,
//! depths or rainfall are rejected instead of producing negative outputs.

pub mod magnitude;
pub mod runoff;
pub mod wave;

/// Clamp into [0, 1]
pub fn clip01(x: f64) -> f64 {
    x.clamp(0.0, 1.0)
}

pub fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
