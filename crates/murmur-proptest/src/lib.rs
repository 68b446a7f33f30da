#![doc = include_str!("../README.md")]

pub mod comparison;
pub mod generators;

pub use proptest;
pub use test_strategy;
