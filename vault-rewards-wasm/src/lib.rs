//! Vault Rewards WASM - Client-Side Calculator
//!
//! Exposes the rewards engine to the web client:
//! - Rewards calculator projections and display strings
//! - Voting escrow balances for a lock
//! - Cross-version vault position totals
//!
//! Structured inputs travel as JSON; results come back as objects with
//! getters and an `error` field instead of thrown exceptions.
//!
//! ## Usage in JavaScript
//!
//! ```javascript
//! import init, { project_rewards, escrow_balance } from 'vault-rewards-wasm';
//!
//! await init();
//!
//! const result = project_rewards(JSON.stringify({ inputs, snapshot }));
//! console.log(result.total_apy, result.rewards_booster);
//!
//! const escrow = escrow_balance("1000", 18, 365);
//! console.log(escrow.escrow); // "250"
//! ```
//!
//! ## Build
//!
//! ```bash
//! wasm-pack build --target web --out-dir pkg
//! ```

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use vault_rewards::{
    merge_across_versions, CalculatorInputs, FixedPointAmount, LockupPeriod, RewardsCalculator,
    RewardsConfig, RewardsDisplay, RewardsSnapshot, VaultAccountRecord, VersionedAccounts,
};

// Initialize panic hook for better error messages in browser console
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

// ============================================================================
// Types
// ============================================================================

/// Calculator output for one set of inputs
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct RewardsResult {
    display: RewardsDisplay,
    base_apy: Option<f64>,
    boosted_apy: Option<f64>,
    boost_multiplier: Option<f64>,
    error: Option<String>,
}

#[wasm_bindgen]
impl RewardsResult {
    /// Formatted total yield ("12.34%")
    #[wasm_bindgen(getter)]
    pub fn total_apy(&self) -> String {
        self.display.total_apy.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn base_rewards(&self) -> String {
        self.display.base_rewards.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn boosted_rewards(&self) -> String {
        self.display.boosted_rewards.clone()
    }

    /// Formatted multiplier ("1.85"), or "---" when undefined
    #[wasm_bindgen(getter)]
    pub fn rewards_booster(&self) -> String {
        self.display.rewards_booster.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn base_apy(&self) -> Option<f64> {
        self.base_apy
    }

    #[wasm_bindgen(getter)]
    pub fn boosted_apy(&self) -> Option<f64> {
        self.boosted_apy
    }

    #[wasm_bindgen(getter)]
    pub fn boost_multiplier(&self) -> Option<f64> {
        self.boost_multiplier
    }

    /// Error message if the inputs could not be projected
    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.error.clone()
    }

    fn new_error(error_msg: String) -> Self {
        Self {
            display: RewardsDisplay::unavailable(),
            base_apy: None,
            boosted_apy: None,
            boost_multiplier: None,
            error: Some(error_msg),
        }
    }
}

/// Voting escrow balance for a lock
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct EscrowResult {
    escrow: String,
    error: Option<String>,
}

#[wasm_bindgen]
impl EscrowResult {
    /// Escrow balance as a decimal string
    #[wasm_bindgen(getter)]
    pub fn escrow(&self) -> String {
        self.escrow.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.error.clone()
    }
}

/// Merged vault position
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct MergeResult {
    has_position: bool,
    position_json: String,
    error: Option<String>,
}

#[wasm_bindgen]
impl MergeResult {
    /// False when no version holds any history
    #[wasm_bindgen(getter)]
    pub fn has_position(&self) -> bool {
        self.has_position
    }

    /// The merged position as JSON, or "null"
    #[wasm_bindgen(getter)]
    pub fn position_json(&self) -> String {
        self.position_json.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.error.clone()
    }

    fn new_error(error_msg: String) -> Self {
        Self {
            has_position: false,
            position_json: "null".to_string(),
            error: Some(error_msg),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProjectionRequest {
    inputs: CalculatorInputs,
    snapshot: RewardsSnapshot,
    #[serde(default)]
    config: Option<RewardsConfig>,
}

#[derive(Debug, Serialize)]
struct LockupOption {
    key: &'static str,
    label: &'static str,
    days: i64,
}

// ============================================================================
// Calculator
// ============================================================================

/// Project rewards for calculator inputs against a resolved snapshot
///
/// # Arguments
/// * `request_json` - `{ inputs, snapshot, config? }`
///
/// # Returns
/// A RewardsResult with display strings and raw figures
#[wasm_bindgen]
pub fn project_rewards(request_json: &str) -> RewardsResult {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    let request: ProjectionRequest = match serde_json::from_str(request_json) {
        Ok(request) => request,
        Err(e) => return RewardsResult::new_error(format!("Invalid request: {}", e)),
    };
    let config = request.config.unwrap_or_default();
    if let Err(e) = config.validate() {
        return RewardsResult::new_error(e.to_string());
    }

    let calculator = RewardsCalculator::new(config);
    match calculator.project(&request.inputs, &request.snapshot) {
        Ok(projection) => RewardsResult {
            display: RewardsDisplay::from_projection(&projection),
            base_apy: Some(projection.base_apy),
            boosted_apy: projection.boosted_apy,
            boost_multiplier: projection.boost_multiplier.value(),
            error: None,
        },
        Err(e) => RewardsResult::new_error(e.to_string()),
    }
}

/// Keep a typed value only if it reads as a non-negative number
#[wasm_bindgen]
pub fn sanitize_input(input: &str) -> String {
    vault_rewards::sanitize_input(input)
}

/// Lockup presets as JSON: `[{ key, label, days }]`
#[wasm_bindgen]
pub fn lockup_periods() -> String {
    let options: Vec<LockupOption> = LockupPeriod::ALL
        .iter()
        .map(|period| LockupOption {
            key: period.key(),
            label: period.label(),
            days: period.days(),
        })
        .collect();
    serde_json::to_string(&options).unwrap_or_else(|_| "[]".to_string())
}

// ============================================================================
// Voting Escrow
// ============================================================================

/// Voting power for `locked` governance tokens over `days`
///
/// Uses the default maximum lock length.
#[wasm_bindgen]
pub fn escrow_balance(locked: &str, decimals: u8, days: i32) -> EscrowResult {
    let locked = match FixedPointAmount::parse(locked, decimals) {
        Ok(amount) => amount,
        Err(e) => {
            return EscrowResult {
                escrow: String::new(),
                error: Some(format!("Invalid locked amount: {}", e)),
            }
        }
    };

    let model = RewardsConfig::default().voting_power_model();
    EscrowResult {
        escrow: model
            .compute_escrow_balance(&locked, i64::from(days))
            .to_string(),
        error: None,
    }
}

// ============================================================================
// Positions
// ============================================================================

/// Merge one vault's per-version account records
///
/// # Arguments
/// * `records_json` - Array of account records, at most one per version
#[wasm_bindgen]
pub fn merge_vault_accounts(records_json: &str) -> MergeResult {
    let records: Vec<VaultAccountRecord> = match serde_json::from_str(records_json) {
        Ok(records) => records,
        Err(e) => return MergeResult::new_error(format!("Invalid records: {}", e)),
    };

    let mut accounts = VersionedAccounts::default();
    for record in records {
        let version = record.version;
        if accounts.insert(record).is_some() {
            return MergeResult::new_error(format!("Duplicate record for version {}", version));
        }
    }

    let merged = match merge_across_versions(&accounts) {
        Ok(merged) => merged,
        Err(e) => return MergeResult::new_error(e.to_string()),
    };
    match serde_json::to_string(&merged) {
        Ok(position_json) => MergeResult {
            has_position: merged.is_some(),
            position_json,
            error: None,
        },
        Err(e) => MergeResult::new_error(e.to_string()),
    }
}

/// Get the WASM module version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "gauge": {
            "working_balance": { "raw": "0", "scale": 18 },
            "working_supply": { "raw": "40000000000000000000", "scale": 18 },
            "pool_size": { "raw": "100000000000000000000", "scale": 18 },
            "pool_reward_for_duration": { "raw": "1000000000000000000000", "scale": 18 },
            "unstaked_balance": { "raw": "0", "scale": 18 }
        },
        "vault": {
            "asset": "weth",
            "decimals": 18,
            "price_per_share": { "raw": "1000000000000000000", "scale": 18 }
        },
        "total_ve_supply": { "raw": "1000000000000000000000000", "scale": 18 },
        "asset_price": 2000.0,
        "reward_token_price": 1.0
    }"#;

    fn request(stake: &str, locked: &str, lockup: &str) -> String {
        format!(
            r#"{{ "inputs": {{ "stake": "{}", "locked": "{}", "lockup": "{}" }}, "snapshot": {} }}"#,
            stake, locked, lockup, SNAPSHOT
        )
    }

    #[test]
    fn test_project_rewards() {
        let result = project_rewards(&request("100", "", "WEEK"));

        assert!(result.error.is_none(), "{:?}", result.error);
        assert_eq!(result.display.rewards_booster, "1.00");
        assert_eq!(result.boost_multiplier, Some(1.0));
        let expected = 1000.0 / 400_000.0 * 365.0 / 7.0 * 100.0;
        assert!((result.base_apy.unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_project_rewards_with_lock() {
        let result = project_rewards(&request("10", "500000", "2YEAR"));
        assert!(result.boost_multiplier.unwrap() > 1.0);
        assert!(result.boosted_apy.unwrap() > result.base_apy.unwrap());
    }

    #[test]
    fn test_project_rewards_bad_input() {
        let result = project_rewards(&request("ten", "0", "WEEK"));
        assert!(result.error.unwrap().contains("stake"));
        assert_eq!(result.display.total_apy, "---");

        let result = project_rewards("not json");
        assert!(result.error.unwrap().contains("Invalid request"));
    }

    #[test]
    fn test_escrow_balance() {
        let result = escrow_balance("1000", 18, 365);
        assert_eq!(result.escrow, "250");
        assert!(result.error.is_none());

        assert_eq!(escrow_balance("1000", 18, 5000).escrow, "1000");
        assert!(escrow_balance("1.5.0", 18, 7).error.is_some());
    }

    #[test]
    fn test_merge_vault_accounts() {
        let records = r#"[
            { "vault_id": "rETH-THETA", "version": "v1",
              "total_deposits": { "raw": "100", "scale": 0 },
              "total_yield_earned": { "raw": "3", "scale": 0 },
              "total_balance": { "raw": "103", "scale": 0 } },
            { "vault_id": "rETH-THETA", "version": "v2",
              "total_deposits": { "raw": "50", "scale": 0 },
              "total_yield_earned": { "raw": "1", "scale": 0 },
              "total_balance": { "raw": "51", "scale": 0 } }
        ]"#;

        let result = merge_vault_accounts(records);
        assert!(result.error.is_none(), "{:?}", result.error);
        assert!(result.has_position);

        let merged: serde_json::Value = serde_json::from_str(&result.position_json).unwrap();
        assert_eq!(merged["total_deposits"]["raw"], "150");
        assert_eq!(merged["total_balance"]["raw"], "154");
    }

    #[test]
    fn test_merge_vault_accounts_empty_and_duplicate() {
        let result = merge_vault_accounts("[]");
        assert!(!result.has_position);
        assert_eq!(result.position_json, "null");

        let record = r#"{ "vault_id": "rETH-THETA", "version": "earn",
              "total_deposits": { "raw": "1", "scale": 0 },
              "total_yield_earned": { "raw": "0", "scale": 0 },
              "total_balance": { "raw": "1", "scale": 0 } }"#;
        let result = merge_vault_accounts(&format!("[{}, {}]", record, record));
        assert!(result.error.unwrap().contains("Duplicate"));
    }

    #[test]
    fn test_lockup_periods() {
        let options: serde_json::Value = serde_json::from_str(&lockup_periods()).unwrap();
        assert_eq!(options.as_array().unwrap().len(), 6);
        assert_eq!(options[0]["key"], "WEEK");
        assert_eq!(options[5]["days"], 730);
    }

    #[test]
    fn test_sanitize_input() {
        assert_eq!(sanitize_input("4.2"), "4.2");
        assert_eq!(sanitize_input("-1"), "");
    }
}

// ============================================================================
// WASM-specific Tests
// ============================================================================

#[cfg(test)]
mod wasm_tests {
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    use super::*;

    #[wasm_bindgen_test]
    fn test_wasm_escrow_balance() {
        let result = escrow_balance("1000", 18, 730);
        assert_eq!(result.escrow(), "500");
        assert!(result.error().is_none());
    }

    #[wasm_bindgen_test]
    fn test_wasm_merge_empty() {
        let result = merge_vault_accounts("[]");
        assert!(!result.has_position());
    }
}
