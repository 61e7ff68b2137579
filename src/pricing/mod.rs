mod calculator;

pub use calculator::{compute_breakdown, override_surcharge, PricingCalculator};
