//! Plan entitlements: costs, level gating, retention, key limits.
//!
//! ## Plans
//! - **Trial**: 10 starting credits, 1 active key, 24h retention, standard level only
//! - **Basic**: 40 credits, 10 active keys, 72h retention, standard level only
//! - **Pro**: 40 credits, 10 active keys, permanent retention, standard level only
//! - **Infinite**: never charged, unlimited keys, permanent retention, every level
//!
//! ## Components
//! - **plans**: per-plan limits and the public catalog
//! - **policy**: operation costs, authorization checks, expiration

pub mod plans;
pub mod policy;

pub use plans::{plan_catalog, PlanLimits};
pub use policy::{
    authorize, check_credits, check_level, credit_cost, expiration_for, permanent_expiration,
    Charge, OperationKind,
};
