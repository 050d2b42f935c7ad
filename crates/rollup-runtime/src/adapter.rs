use std::time::Instant;

use orion_error::compat_prelude::*;
use orion_error::prelude::*;
use rollup_core::{Bin, Record, RollupOptions, timeseries};

use crate::error::{RuntimeReason, RuntimeResult};

/// Run a rollup off the async executor.
///
/// The core computation is synchronous and CPU-bound, so it is moved to the
/// blocking pool; the caller's task only awaits the result. A panic inside
/// the computation surfaces as an [`RuntimeReason::Adapter`] error.
pub async fn run_rollup(records: Vec<Record>, options: RollupOptions) -> RuntimeResult<Vec<Bin>> {
    let started = Instant::now();
    let input = records.len();
    let bins = tokio::task::spawn_blocking(move || timeseries(&records, &options))
        .await
        .owe(RuntimeReason::Adapter)?
        .err_conv()?;
    rl_debug!(
        data,
        records = input,
        bins = bins.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "rollup finished"
    );
    Ok(bins)
}
