//! registrysync CLI — watch a data registry and resolve its content.
//!
//! Usage:
//! ```bash
//! registrysync watch --rpc https://testnet-rpc.monad.xyz/ --contract 0x82aB...
//! registrysync resolve --cid QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG
//! registrysync bridge-status --url http://localhost:5000
//! registrysync info
//! ```

use std::env;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};

use registrysync_core::{
    ContentResolver, DisplaySink, GatewayConfig, IntervalTicks, ResolutionState, TableSnapshot,
};
use registrysync_evm::{RegistryRpc, SyncBuilder, SyncLoop};
use registrysync_gateway::{BridgeClient, GatewayPool};

const DEFAULT_RPC: &str = "https://testnet-rpc.monad.xyz/";
const DEFAULT_CONTRACT: &str = "0x82aB691cbA54EB95E09aC69Cc170AB14bBf1299e";
// keccak256("DataRegistered(string,bytes32,address,uint256)")
const DEFAULT_TOPIC: &str = "0x589fb78ac823f5a7e552de8b8d50b3ffe12200275d5d8d483cee2156bb0f99be";
const DEFAULT_BRIDGE: &str = "http://localhost:5000";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "watch" => cmd_watch(&args[2..]).await,
        "resolve" => cmd_resolve(&args[2..]).await,
        "bridge-status" => cmd_bridge_status(&args[2..]).await,
        "bridge-start" => cmd_bridge_start(&args[2..]).await,
        "info" => {
            cmd_info();
            Ok(())
        }
        "version" | "--version" | "-V" => {
            println!("registrysync {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("registrysync {}", env!("CARGO_PKG_VERSION"));
    println!("Watch an on-chain data registry and resolve its content\n");
    println!("USAGE:");
    println!("    registrysync <COMMAND>\n");
    println!("COMMANDS:");
    println!("    watch          Follow the registry log and print the reconciled table");
    println!("    resolve        Resolve one content id across the gateway pool");
    println!("    bridge-status  Query the publisher bridge's liveness");
    println!("    bridge-start   Ask the control service to start the bridge");
    println!("    info           Show default configuration");
    println!("    version        Print version");
    println!("    help           Print this help\n");
    println!("WATCH FLAGS:");
    println!("    --rpc <URL>         JSON-RPC endpoint      [default: {DEFAULT_RPC}]");
    println!("    --contract <ADDR>   Registry contract      [default: {DEFAULT_CONTRACT}]");
    println!("    --topic0 <HASH>     Event topic filter");
    println!("    --span <BLOCKS>     Bootstrap window       [default: 100]");
    println!("    --interval-ms <MS>  Poll interval          [default: 5000]");
    println!("    --account <ADDR>    Report this account's balance at startup");
    println!("    --bridge <URL>      Also poll bridge liveness every 5s");
}

async fn cmd_watch(args: &[String]) -> Result<()> {
    let rpc = parse_flag(args, "--rpc").unwrap_or_else(|| DEFAULT_RPC.into());
    let contract = parse_flag(args, "--contract").unwrap_or_else(|| DEFAULT_CONTRACT.into());
    let topic = parse_flag(args, "--topic0").unwrap_or_else(|| DEFAULT_TOPIC.into());

    let mut builder = SyncBuilder::new().contract(contract).event_topic(topic);
    if let Some(span) = parse_flag(args, "--span") {
        builder = builder.bootstrap_span(span.parse().context("--span must be a block count")?);
    }
    if let Some(ms) = parse_flag(args, "--interval-ms") {
        builder =
            builder.poll_interval_ms(ms.parse().context("--interval-ms must be milliseconds")?);
    }
    let config = builder.build_config();

    let client = RegistryRpc::new(&rpc, &config);
    println!("Watching {} on {rpc}", config.contract);

    if let Some(account) = parse_flag(args, "--account") {
        match client.balance(&account).await {
            Ok(wei) => println!("Balance of {account}: {:.4} MON", wei as f64 / 1e18),
            Err(e) => tracing::warn!(error = %e, "balance query failed"),
        }
    }

    if let Some(bridge_url) = parse_flag(args, "--bridge") {
        tokio::spawn(probe_bridge(BridgeClient::new(bridge_url)));
    }

    let resolver = Arc::new(GatewayPool::http(GatewayConfig::default()));
    let mut sync = SyncLoop::new(config.clone(), client, Arc::new(ConsoleSink))
        .with_resolver(resolver);

    // A failure here happens before the polling loop exists and is
    // worth surfacing loudly; the loop below still retries it.
    if let Err(e) = sync.poll_once().await {
        eprintln!("Initial load failed: {e}");
    }

    sync.run(IntervalTicks::from_millis(config.poll_interval_ms))
        .await;
    Ok(())
}

async fn probe_bridge(bridge: BridgeClient) {
    use registrysync_core::TickSource;

    let mut ticks = IntervalTicks::from_millis(5_000);
    while ticks.next_tick().await {
        match bridge.status().await {
            Ok(s) if s.bridge_running => tracing::info!("registry bridge online"),
            Ok(_) => tracing::warn!("registry bridge offline"),
            Err(e) => tracing::warn!(error = %e, "registry bridge unreachable"),
        }
    }
}

async fn cmd_resolve(args: &[String]) -> Result<()> {
    let cid = parse_flag(args, "--cid").context("--cid is required")?;

    let pool = GatewayPool::http(GatewayConfig::default());
    match pool.resolve(&cid).await {
        Ok(reading) => {
            println!("temperature: {}", format_temp(reading.temperature));
            println!("humidity:    {}", format_hum(reading.humidity));
        }
        Err(e) => println!("unresolved: {e}"),
    }
    Ok(())
}

async fn cmd_bridge_status(args: &[String]) -> Result<()> {
    let url = parse_flag(args, "--url").unwrap_or_else(|| DEFAULT_BRIDGE.into());
    let client = BridgeClient::new(url);
    match client.status().await {
        Ok(s) if s.bridge_running => println!("Registry bridge: online"),
        Ok(_) => println!("Registry bridge: offline"),
        Err(e) => println!("Registry bridge: unreachable ({e})"),
    }
    Ok(())
}

async fn cmd_bridge_start(args: &[String]) -> Result<()> {
    let url = parse_flag(args, "--url").unwrap_or_else(|| DEFAULT_BRIDGE.into());
    let client = BridgeClient::new(url);
    let message = client.start().await.context("bridge start failed")?;
    println!("{message}");
    Ok(())
}

fn cmd_info() {
    println!("registrysync v{}", env!("CARGO_PKG_VERSION"));
    println!("  Registry event: DataRegistered(string,bytes32,address,uint256)");
    println!("  Default bootstrap window: 100 blocks");
    println!("  Default poll interval: 5s");
    println!("  Default gateways: Pinata, ipfs.io, Cloudflare, dweb.link");
    println!("  Per-gateway timeout: 8s, one resolution attempt per record");
}

/// Prints the reconciled table after every published snapshot.
struct ConsoleSink;

impl DisplaySink for ConsoleSink {
    fn publish(&self, snapshot: TableSnapshot) {
        if snapshot.is_empty() {
            println!("No data registered yet.");
            return;
        }

        println!(
            "{:<20} {:>9} {:>8}  {:<16} {:<16} {:<16}",
            "TIME", "TEMP", "HUM", "PUBLISHER", "CID", "HASH"
        );
        for entry in &snapshot.entries {
            let record = &entry.record;
            let when = chrono::DateTime::from_timestamp(record.timestamp, 0)
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| record.timestamp.to_string());
            let (temp, hum) = match entry.content {
                ResolutionState::Pending => ("...".into(), "...".into()),
                ResolutionState::Resolved(r) => (format_temp(r.temperature), format_hum(r.humidity)),
                ResolutionState::Unresolved => ("N/A".into(), "N/A".into()),
            };
            println!(
                "{:<20} {:>9} {:>8}  {:<16} {:<16} {:<16}",
                when,
                temp,
                hum,
                short(&record.publisher),
                short(&record.content_id),
                short(&record.content_hash)
            );
        }
        println!("{} record(s)", snapshot.len());
    }
}

fn format_temp(t: Option<f64>) -> String {
    t.map(|v| format!("{v}°C")).unwrap_or_else(|| "N/A".into())
}

fn format_hum(h: Option<f64>) -> String {
    h.map(|v| format!("{v}%")).unwrap_or_else(|| "N/A".into())
}

/// Shorten long hex/CID strings for table display.
fn short(s: &str) -> String {
    if s.len() <= 16 {
        s.to_string()
    } else {
        format!("{}..{}", &s[..8], &s[s.len() - 4..])
    }
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_flag_finds_value() {
        let args: Vec<String> = ["--rpc", "http://localhost:8545", "--span", "50"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            parse_flag(&args, "--rpc").as_deref(),
            Some("http://localhost:8545")
        );
        assert_eq!(parse_flag(&args, "--span").as_deref(), Some("50"));
        assert!(parse_flag(&args, "--missing").is_none());
    }

    #[test]
    fn short_display_forms() {
        assert_eq!(short("Qm1"), "Qm1");
        assert_eq!(
            short("0x8a35acfbc15ff81a39ae7d344fd709f28e8600b4aa8c65c6b64bfe7fe36bd19b"),
            "0x8a35ac..d19b"
        );
    }

    #[test]
    fn na_markers_for_missing_fields() {
        assert_eq!(format_temp(None), "N/A");
        assert_eq!(format_hum(None), "N/A");
        assert_eq!(format_temp(Some(22.0)), "22°C");
        assert_eq!(format_hum(Some(55.0)), "55%");
    }
}
