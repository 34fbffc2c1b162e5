//! Scripted investigation tool stubs.
//!
//! Each tool maps an input target (URL, address, or transaction reference) to
//! a deterministic finding report. Analysis "patterns" are derived from a
//! stable hash of the target so repeated lookups agree, and the only
//! free-running variation (gas prices) draws from the session's seeded tools
//! stream. Nothing here touches a network.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use twox_hash::XxHash64;

/// Domain-separation seed for target-derived analysis patterns.
const TOOL_HASH_SEED: u64 = 0x5CA4_D00C;

const LEGIT_DOMAINS: [&str; 4] = ["uniswap.org", "metamask.io", "etherscan.io", "opensea.io"];
const SUSPICIOUS_TLDS: [&str; 6] = ["tk", "ml", "ga", "cf", "xyz", "top"];
const SPOOF_BRANDS: [(&str, &str); 4] = [
    ("metamask", "MetaMask spoofing"),
    ("uniswap", "Uniswap spoofing"),
    ("etherscan", "Etherscan spoofing"),
    ("opensea", "OpenSea spoofing"),
];

/// Identifier for each investigation tool.
///
/// The serde aliases accept the names legacy scenario data used before the
/// stub library settled (`urlAnalyzer`, `domainLookup`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolId {
    #[serde(alias = "urlAnalyzer")]
    UrlScanner,
    ContractAnalyzer,
    GasTracker,
    #[serde(alias = "domainLookup")]
    AddressLookup,
    TransactionTracer,
    TokenScanner,
}

impl ToolId {
    pub const ALL: [Self; 6] = [
        Self::UrlScanner,
        Self::ContractAnalyzer,
        Self::GasTracker,
        Self::AddressLookup,
        Self::TransactionTracer,
        Self::TokenScanner,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UrlScanner => "url_scanner",
            Self::ContractAnalyzer => "contract_analyzer",
            Self::GasTracker => "gas_tracker",
            Self::AddressLookup => "address_lookup",
            Self::TransactionTracer => "transaction_tracer",
            Self::TokenScanner => "token_scanner",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::UrlScanner => "URL Scanner",
            Self::ContractAnalyzer => "Contract Analyzer",
            Self::GasTracker => "Gas Price Tracker",
            Self::AddressLookup => "Address Lookup",
            Self::TransactionTracer => "Transaction Tracer",
            Self::TokenScanner => "Token Security Scanner",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::UrlScanner => "🔍",
            Self::ContractAnalyzer => "⛓️",
            Self::GasTracker => "⛽",
            Self::AddressLookup => "📍",
            Self::TransactionTracer => "🔄",
            Self::TokenScanner => "🪙",
        }
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity tier of a finding report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Info,
    Success,
    Warning,
    Danger,
}

impl RiskTier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Finding report produced by a tool invocation. Always well-formed with at
/// least one finding line, even for malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolReport {
    pub tool: ToolId,
    pub tier: RiskTier,
    pub findings: Vec<String>,
    /// True while the report carries stub output only; enrichment with live
    /// data clears it.
    pub simulated: bool,
}

/// Run one investigation tool against a target.
pub fn analyze(tool: ToolId, target: &str, rng: &mut impl Rng) -> ToolReport {
    match tool {
        ToolId::UrlScanner => scan_url(target),
        ToolId::ContractAnalyzer => analyze_contract(target),
        ToolId::GasTracker => track_gas(rng),
        ToolId::AddressLookup => lookup_address(target),
        ToolId::TransactionTracer => trace_transaction(target),
        ToolId::TokenScanner => scan_token(target),
    }
}

/// `0x` followed by exactly 40 hexadecimal digits.
#[must_use]
pub fn is_address(target: &str) -> bool {
    target.len() == 42
        && target.starts_with("0x")
        && target[2..].bytes().all(|b| b.is_ascii_hexdigit())
}

fn pattern_hash(target: &str) -> u64 {
    XxHash64::oneshot(TOOL_HASH_SEED, target.as_bytes())
}

fn short_address(target: &str) -> String {
    if target.len() > 18 {
        format!("{}...{}", &target[..10], &target[target.len() - 8..])
    } else {
        target.to_string()
    }
}

/// Malformed address-shaped input degrades to a warning report, never an
/// error.
fn address_format_report(tool: ToolId, target: &str) -> ToolReport {
    ToolReport {
        tool,
        tier: RiskTier::Warning,
        findings: vec![
            format!("Input `{target}` is not a valid address"),
            "Expected format: 0x followed by exactly 40 hexadecimal characters".to_string(),
            "Double-check the source you copied this value from".to_string(),
        ],
        simulated: true,
    }
}

fn escalate(tier: &mut RiskTier, to: RiskTier) {
    if to as u8 > *tier as u8 {
        *tier = to;
    }
}

// --- URL scanner -----------------------------------------------------------

fn split_url(target: &str) -> Option<(&str, &str, &str)> {
    let (scheme, rest) = target.split_once("://")?;
    if scheme.is_empty() || rest.is_empty() {
        return None;
    }
    let (host, path) = match rest.split_once('/') {
        Some((host, path)) => (host, path),
        None => (rest, ""),
    };
    if host.is_empty() {
        return None;
    }
    Some((scheme, host, path))
}

fn leet_char_matches(wanted: char, got: char) -> bool {
    got == wanted
        || matches!(
            (wanted, got),
            ('a', '4') | ('e', '3') | ('i', '1') | ('i', 'l') | ('o', '0')
        )
}

/// Look-alike substring check covering the digit/letter swaps phishers use.
fn spoof_match(domain: &str, brand: &str) -> bool {
    let domain: Vec<char> = domain.chars().collect();
    let brand: Vec<char> = brand.chars().collect();
    if domain.len() < brand.len() {
        return false;
    }
    domain.windows(brand.len()).any(|window| {
        window
            .iter()
            .zip(brand.iter())
            .all(|(&got, &wanted)| leet_char_matches(wanted, got))
    })
}

fn is_ip_host(host: &str) -> bool {
    let parts: Vec<&str> = host.split('.').collect();
    parts.len() == 4 && parts.iter().all(|p| !p.is_empty() && p.parse::<u8>().is_ok())
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=a.len()).collect();
    let mut current = vec![0usize; a.len() + 1];
    for (i, bc) in b.iter().enumerate() {
        current[0] = i + 1;
        for (j, ac) in a.iter().enumerate() {
            let substitution = prev[j] + usize::from(ac != bc);
            current[j + 1] = substitution.min(prev[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut prev, &mut current);
    }
    prev[a.len()]
}

fn scan_url(target: &str) -> ToolReport {
    let Some((scheme, host, path)) = split_url(target) else {
        return ToolReport {
            tool: ToolId::UrlScanner,
            tier: RiskTier::Danger,
            findings: vec![
                format!("Invalid URL format: `{target}`"),
                "Copy the link into a text editor to inspect its real characters".to_string(),
            ],
            simulated: true,
        };
    };

    let host_lower = host.to_lowercase();
    let mut tier = RiskTier::Success;
    let mut findings = vec![
        format!("Domain: {host_lower}"),
        format!("Path: /{path}"),
        format!("Protocol: {scheme}"),
    ];
    let mut red_flags = Vec::new();

    if scheme != "https" {
        red_flags.push("Not using HTTPS - insecure connection".to_string());
        escalate(&mut tier, RiskTier::Warning);
    }

    let is_known_good = LEGIT_DOMAINS.contains(&host_lower.as_str());
    if !is_known_good {
        for (brand, desc) in SPOOF_BRANDS {
            if spoof_match(&host_lower, brand) {
                red_flags.push(format!("{desc} detected"));
                escalate(&mut tier, RiskTier::Danger);
            }
        }
        for legit in LEGIT_DOMAINS {
            let distance = levenshtein(&host_lower, legit);
            if (1..=2).contains(&distance) {
                red_flags.push(format!("Similar to {legit} (possible typosquatting)"));
                escalate(&mut tier, RiskTier::Danger);
            }
        }
    }

    if is_ip_host(&host_lower) {
        red_flags.push("IP address instead of domain".to_string());
        escalate(&mut tier, RiskTier::Danger);
    }
    if host_lower.contains("-verify") {
        red_flags.push("Fake verification subdomain".to_string());
        escalate(&mut tier, RiskTier::Danger);
    }
    if host_lower.contains("-support") {
        red_flags.push("Fake support site".to_string());
        escalate(&mut tier, RiskTier::Danger);
    }
    if let Some(tld) = host_lower.rsplit('.').next()
        && SUSPICIOUS_TLDS.contains(&tld)
    {
        red_flags.push(format!("Suspicious TLD: .{tld}"));
        escalate(&mut tier, RiskTier::Warning);
    }

    let subdomain_levels = host_lower.split('.').count();
    if subdomain_levels > 3 {
        findings.push(format!("Multiple subdomains: {subdomain_levels} levels"));
    }
    if target.contains('%') {
        findings.push("URL encoding detected - verify destination".to_string());
    }

    findings.push("Check domain spelling carefully (l vs i, 0 vs o)".to_string());
    findings.push("Never trust links from unsolicited messages".to_string());
    if !red_flags.is_empty() {
        findings.push("Red flags detected:".to_string());
        findings.append(&mut red_flags);
    }

    ToolReport {
        tool: ToolId::UrlScanner,
        tier,
        findings,
        simulated: true,
    }
}

// --- Contract analyzer -----------------------------------------------------

fn analyze_contract(target: &str) -> ToolReport {
    if !is_address(target) {
        return address_format_report(ToolId::ContractAnalyzer, target);
    }

    let hash = pattern_hash(target);
    let verified = hash % 3 != 0;
    let has_upgrade = hash % 5 == 0;
    let has_mint = hash % 4 == 0;
    let has_pause = hash % 6 == 0;
    let hidden_fees = hash % 7 == 0;
    let owner_renounced = hash % 8 == 0;
    let owner_multisig = hash % 9 == 0 && hash % 8 != 0;

    let mut findings = vec![format!("Contract analysis: {}", short_address(target))];
    let mut critical = Vec::new();

    if verified {
        findings.push("Source code verified on the block explorer".to_string());
    } else {
        findings.push("Source code NOT verified".to_string());
        critical.push("Cannot audit unverified contracts".to_string());
    }

    if has_upgrade {
        findings.push("Upgradeable proxy detected - implementation can change".to_string());
        critical.push("Upgradeable contracts can be swapped for malicious code".to_string());
    }
    if has_mint {
        findings.push("Mint function found - owner can create new tokens".to_string());
        critical.push("Unlimited minting dilutes all holders".to_string());
    }
    if has_pause {
        findings.push("Pausable functions detected - contract can be frozen by owner".to_string());
    }
    if hidden_fees {
        findings.push("Hidden fee structure: buy tax 2%, sell tax 25%".to_string());
        critical.push("Asymmetric fees trap holders - classic rug pull pattern".to_string());
    }

    if owner_renounced {
        findings.push("Ownership renounced - no one can change contract parameters".to_string());
    } else if owner_multisig {
        findings.push("Owner is a multi-sig wallet requiring multiple signatures".to_string());
    } else {
        findings.push("Owner is a single externally-owned wallet".to_string());
        critical.push("A single owner can rug pull - check their history".to_string());
    }

    findings.push("Read the contract tab before interacting: owner, supply, fees".to_string());
    if !critical.is_empty() {
        findings.push("Critical red flags:".to_string());
        findings.extend_from_slice(&critical);
    }

    let tier = if critical.len() > 2 {
        RiskTier::Danger
    } else if critical.is_empty() {
        RiskTier::Info
    } else {
        RiskTier::Warning
    };

    ToolReport {
        tool: ToolId::ContractAnalyzer,
        tier,
        findings,
        simulated: true,
    }
}

// --- Gas tracker -----------------------------------------------------------

fn track_gas(rng: &mut impl Rng) -> ToolReport {
    let slow = 8 + rng.gen_range(0..5u32);
    let normal = slow + 5 + rng.gen_range(0..5u32);
    let fast = normal + 8 + rng.gen_range(0..8u32);

    let findings = vec![
        "Current gas prices (gwei):".to_string(),
        format!("Slow: {slow} gwei (~5 min)"),
        format!("Normal: {normal} gwei (~2 min)"),
        format!("Fast: {fast} gwei (~30 sec)"),
        "Check the gas estimate before approving any transaction".to_string(),
        "Malicious contracts hide gas-bomb functions; simulate before executing".to_string(),
    ];

    ToolReport {
        tool: ToolId::GasTracker,
        tier: if fast > 100 {
            RiskTier::Warning
        } else {
            RiskTier::Info
        },
        findings,
        simulated: true,
    }
}

// --- Address lookup --------------------------------------------------------

fn lookup_address(target: &str) -> ToolReport {
    if !is_address(target) {
        return address_format_report(ToolId::AddressLookup, target);
    }

    let hash = pattern_hash(target);
    let balance_milli = hash % 10_000;
    let tx_count = hash % 500 + 10;
    let days_old = hash % 365 + 1;
    let last_seen_hours = hash % 30;
    let is_new = days_old < 30;
    let high_activity = tx_count > 400;
    let incoming_only = hash % 11 == 0;
    let is_contract = hash % 7 == 0;

    let mut findings = vec![
        format!("Address: {}", short_address(target)),
        format!("Balance: {}.{:03} ETH", balance_milli / 1000, balance_milli % 1000),
        format!("Total transactions: {tx_count}"),
        format!("First activity: {days_old} days ago"),
        format!("Last activity: {last_seen_hours} hours ago"),
    ];
    let mut risks = Vec::new();

    if is_new {
        findings.push("Created less than 30 days ago".to_string());
        risks.push("New addresses may be throwaway scam wallets".to_string());
    }
    if high_activity {
        findings.push("Many transactions in a short time - bot, exchange, or suspicious".to_string());
    }
    if incoming_only {
        findings.push("Only incoming transactions - funds go in but never come out".to_string());
        risks.push("Classic honeypot: deposits but no withdrawals".to_string());
    }
    if is_contract {
        findings.push("This is a smart contract, not a wallet".to_string());
    }

    if !risks.is_empty() {
        findings.push("Risk indicators:".to_string());
        findings.extend_from_slice(&risks);
    }

    let tier = if risks.len() > 1 {
        RiskTier::Danger
    } else if risks.is_empty() {
        RiskTier::Info
    } else {
        RiskTier::Warning
    };

    ToolReport {
        tool: ToolId::AddressLookup,
        tier,
        findings,
        simulated: true,
    }
}

// --- Transaction tracer ----------------------------------------------------

fn trace_transaction(target: &str) -> ToolReport {
    let hash = pattern_hash(target);
    let value_centi = hash % 100;
    let gas_used = hash % 300_000 + 21_000;
    let gas_price = hash % 50 + 10;
    let success = hash % 10 > 2;
    let has_internal = hash % 5 == 0;
    let sweeper = has_internal && hash % 13 == 0;
    let high_gas = gas_used > 250_000;

    let mut findings = vec![
        format!("Transaction analysis: {}", short_address(target)),
        format!("Value: 0.{value_centi:02} ETH"),
        format!("Gas used: {gas_used} at {gas_price} gwei"),
        format!("Status: {}", if success { "success" } else { "failed" }),
    ];
    let mut warnings = Vec::new();

    if has_internal {
        findings.push("Internal transactions present - check where funds actually went".to_string());
        if sweeper {
            findings.push("Funds immediately forwarded to another address".to_string());
            warnings.push("Sweeper bot pattern - instant rug pull mechanism".to_string());
        }
    }
    if !success {
        findings.push("Failed withdrawals are a honeypot signal; check the revert reason".to_string());
    }
    if high_gas {
        findings.push("Gas usage is abnormally high".to_string());
        warnings.push("High gas may indicate a gas bomb or poorly coded contract".to_string());
    }

    if !warnings.is_empty() {
        findings.push("Warning signs:".to_string());
        findings.extend_from_slice(&warnings);
    }

    let tier = if !warnings.is_empty() {
        RiskTier::Danger
    } else if success {
        RiskTier::Info
    } else {
        RiskTier::Warning
    };

    ToolReport {
        tool: ToolId::TransactionTracer,
        tier,
        findings,
        simulated: true,
    }
}

// --- Token scanner ---------------------------------------------------------

fn scan_token(target: &str) -> ToolReport {
    if !is_address(target) {
        return address_format_report(ToolId::TokenScanner, target);
    }

    let hash = pattern_hash(target);
    let buy_tax = hash % 10;
    let sell_tax = buy_tax + hash % 20;
    let is_honeypot = hash % 8 == 0;
    let hidden_mint = hash % 7 == 0;
    let can_pause = hash % 6 == 0;
    let asymmetric_tax = sell_tax > buy_tax * 2;

    let mut risk_score: u64 = 0;
    if is_honeypot {
        risk_score += 80;
    }
    if hidden_mint {
        risk_score += 30;
    }
    if can_pause {
        risk_score += 20;
    }
    if asymmetric_tax {
        risk_score += 25;
    }
    let risk_score = risk_score.min(100);

    let mut findings = vec![
        format!("Token security scan: {}", short_address(target)),
        format!("Risk score: {risk_score}/100"),
        format!("Buy tax: {buy_tax}% | Sell tax: {sell_tax}%"),
    ];
    let mut critical = Vec::new();

    if is_honeypot {
        findings.push("Transfer restrictions found: you can buy but cannot sell".to_string());
        critical.push("Honeypot: do not buy this token".to_string());
    }
    if hidden_mint {
        findings.push("Hidden mint function - no max supply protection".to_string());
        critical.push("Owner can dilute holdings infinitely".to_string());
    }
    if can_pause {
        findings.push("Pausable transfers - owner can freeze all trading".to_string());
        critical.push("Trading can be disabled by the owner".to_string());
    }
    if asymmetric_tax {
        findings.push("Sell tax far exceeds buy tax".to_string());
        critical.push("Asymmetric tax traps holders".to_string());
    }

    findings.push("Test with a small amount first and verify on an automated scanner".to_string());
    if !critical.is_empty() {
        findings.push("Critical issues found:".to_string());
        findings.extend_from_slice(&critical);
        findings.push("Recommendation: do not buy".to_string());
    }

    let tier = if risk_score > 70 {
        RiskTier::Danger
    } else if risk_score > 40 {
        RiskTier::Warning
    } else {
        RiskTier::Info
    };

    ToolReport {
        tool: ToolId::TokenScanner,
        tier,
        findings,
        simulated: true,
    }
}
