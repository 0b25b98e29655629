//! Batch orchestration: validate, then render each record in order with cooperative pacing.

pub mod batch;
