//! Tally
//!
//! Tally is a deterministic cart pricing and promotion calculation engine. Given an
//! aggregated cart, a snapshot of the active promotion catalog, and an optional coupon
//! code, it computes which combo and coupon promotions apply, how much discount each
//! line receives, which lines are free gifts, what is still missing to unlock an
//! almost-qualifying combo, and the final payable total. One read pass, no writes.

pub mod cart;
pub mod catalog;
pub mod evaluate;
pub mod money;
pub mod summary;
