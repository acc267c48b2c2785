//! Headless balance runner.
//!
//! Usage: `horde-core [balance.json|balance.ron]`. Without an argument the
//! default `BalanceConfig` is used. The report goes to stdout as JSON.

use std::path::Path;

use anyhow::{bail, Context, Result};
use horde_core::balance::{run_balance_simulation, BalanceConfig};
use horde_core::logging::{init_tracing, TracingConfig};

fn load_config(path: &Path) -> Result<BalanceConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config: BalanceConfig = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&text).context("parsing JSON balance config")?,
        Some("ron") => ron::from_str(&text).context("parsing RON balance config")?,
        other => bail!("unsupported config format: {}", other.unwrap_or("<none>")),
    };
    config.sim.validate().context("invalid simulation config")?;
    Ok(config)
}

fn main() -> Result<()> {
    init_tracing(&TracingConfig::quiet());

    let config = match std::env::args().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None => BalanceConfig::default(),
    };
    if config.run_count == 0 {
        bail!("run_count must be at least 1");
    }

    let report = run_balance_simulation(&config);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
