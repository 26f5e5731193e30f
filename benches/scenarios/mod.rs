//! Real-world scenario benchmarks.

mod voices;

pub use voices::{bench_render, bench_voice_churn};
