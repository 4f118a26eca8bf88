use crate::models::AddressReport;
use anyhow::{Context, Result};
use chrono::Local;
use core_logic::ResultsError;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fs::{self, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::info;

const SEPARATOR: &str = "====================";
const BLOCK_RULE: &str = "------------------------------------------";

/// Width the header value fields are padded to. Keeps the header region at a
/// constant byte length so it can be rewritten in place without touching the
/// appended body.
const HEADER_VALUE_WIDTH: usize = 24;

#[derive(Debug, Clone, Default)]
pub struct AggregateTotals {
    pub total_axies: u64,
    pub total_usd_value: Decimal,
    pub result_count: u64,
}

/// Owns the result file and the running totals.
///
/// `record` is one critical section: append the block, bump the totals,
/// rewrite the header region. The mutex makes the whole sequence atomic
/// under concurrent worker completions.
pub struct ResultsManager {
    path: PathBuf,
    header_len: u64,
    state: Mutex<AggregateTotals>,
}

impl ResultsManager {
    /// Creates the results directory and a fresh result file with a
    /// zero-value header. Failure here is fatal to the run: there is no
    /// degraded mode without a results sink.
    pub fn create(results_dir: &str, expected_count: usize) -> Result<Self> {
        fs::create_dir_all(results_dir).map_err(|e| ResultsError::CreateDirFailed {
            path: results_dir.to_string(),
            msg: e.to_string(),
        })?;

        let stamp = Local::now().format("%d.%m.%Y_%H-%M-%S");
        let file_name = format!("{} [{} address].txt", stamp, expected_count);
        let path = Path::new(results_dir).join(file_name);

        let header = render_header(&AggregateTotals::default());
        fs::write(&path, &header).map_err(|e| ResultsError::WriteFailed {
            path: path.display().to_string(),
            msg: e.to_string(),
        })?;

        info!("Created result file {}", path.display());

        Ok(Self {
            path,
            header_len: header.len() as u64,
            state: Mutex::new(AggregateTotals::default()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persists one qualifying report and folds it into the totals.
    pub async fn record(&self, report: &AddressReport) -> Result<()> {
        let mut totals = self.state.lock().await;

        let block = format_report_block(report);
        let mut file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        file.write_all(block.as_bytes())
            .with_context(|| format!("Failed to append to {}", self.path.display()))?;

        totals.total_axies += report.axie_count;
        totals.total_usd_value = totals
            .total_usd_value
            .checked_add(report.total_usd_value)
            .unwrap_or(totals.total_usd_value);
        totals.result_count += 1;

        self.rewrite_header(&totals)?;

        info!("Recorded result for {}", report.address);
        Ok(())
    }

    pub async fn totals(&self) -> AggregateTotals {
        self.state.lock().await.clone()
    }

    /// Overwrites exactly the fixed-size header region at the start of the
    /// file; the body past `header_len` is never touched.
    fn rewrite_header(&self, totals: &AggregateTotals) -> Result<()> {
        let header = render_header(totals);
        debug_assert_eq!(header.len() as u64, self.header_len);

        let mut file = OpenOptions::new()
            .write(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(header.as_bytes())
            .with_context(|| format!("Failed to rewrite header of {}", self.path.display()))?;
        Ok(())
    }
}

/// `15.5` -> `"15.50"`, matching the original two-decimal money format.
pub fn fmt_usd(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

fn render_header(totals: &AggregateTotals) -> String {
    format!(
        "{sep}\n\nTotal Finded: {finded:<width$}\nTotal Axies: {axies:<width$}\n\n{sep}\n\n",
        sep = SEPARATOR,
        finded = format!("{}$", fmt_usd(totals.total_usd_value)),
        axies = totals.total_axies,
        width = HEADER_VALUE_WIDTH,
    )
}

fn format_report_block(report: &AddressReport) -> String {
    let mut block = format!("{} - {}\n", report.address, report.explorer_url);

    match &report.private_key {
        Some(key) => block.push_str(&format!("Key: {}\n", key)),
        None => block.push_str("Key: None\n"),
    }

    block.push_str(&format!("Total: {}$\n", fmt_usd(report.total_usd_value)));

    if !report.tokens.is_empty() {
        block.push_str("Tokens:\n");
        for token in &report.tokens {
            block.push_str(&format!(
                " - {} {} ({}$)\n",
                token.balance,
                token.symbol,
                fmt_usd(token.usd_value)
            ));
        }
    }

    if report.axie_count > 0 {
        block.push_str("NFT:\n");
        block.push_str(&format!(" - {} Axies\n", report.axie_count));
    }

    block.push_str(BLOCK_RULE);
    block.push('\n');
    block
}
