//! Badges and superpowers
//!
//! A reward's unlocked state is derived on every profile read by evaluating
//! its [`RewardTrigger`]; it is never stored.

mod checker;
mod definitions;

pub use checker::{evaluate_rules, RewardContext};
pub use definitions::{RewardCategory, RewardRule, RewardTrigger};
