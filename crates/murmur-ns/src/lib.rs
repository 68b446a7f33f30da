#![doc = include_str!("../README.md")]

pub mod config;
pub(crate) mod framer;
pub(crate) mod noise_estimator;
pub(crate) mod overlap_add;
pub(crate) mod wiener_filter;

pub use framer::Framer;
pub use noise_estimator::NoiseEstimator;
pub use overlap_add::OverlapAdd;
pub use wiener_filter::WienerFilter;
