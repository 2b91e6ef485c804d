//! Raw log handling — the registry event wire format and its decoder.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use registrysync_core::{Record, SyncError};

/// The append-only event source the watcher polls.
///
/// `fetch_range` is inclusive on both ends; callers consult
/// `head_block_number` first so a query never runs past the head.
/// Transport failures are `SourceUnavailable` and treated as
/// transient by the poll loop.
#[async_trait]
pub trait RegistryLog: Send + Sync {
    async fn head_block_number(&self) -> Result<u64, SyncError>;
    async fn fetch_range(&self, from: u64, to: u64) -> Result<Vec<Record>, SyncError>;
}

/// A raw EVM log as returned by `eth_getLogs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLog {
    pub address: String,
    pub topics: Vec<String>,
    pub data: String,
    #[serde(rename = "blockNumber")]
    pub block_number: String,
    #[serde(rename = "transactionHash", default)]
    pub tx_hash: String,
    #[serde(rename = "removed")]
    pub removed: Option<bool>,
}

impl RawLog {
    pub fn block_number_u64(&self) -> u64 {
        parse_hex_u64(&self.block_number)
    }

    /// `true` if the node reports this log as dropped from the
    /// canonical chain.
    pub fn is_removed(&self) -> bool {
        self.removed.unwrap_or(false)
    }
}

/// Parse a hex-encoded quantity (with or without `0x`) to u64.
pub fn parse_hex_u64(s: &str) -> u64 {
    let s = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(s, 16).unwrap_or(0)
}

/// Decode a `DataRegistered(string,bytes32,address,uint256)` log into
/// a [`Record`].
///
/// The event has no indexed parameters, so everything sits ABI-encoded
/// in `data`: a head of four 32-byte words (string offset, content
/// digest, publisher address, timestamp) and a tail holding the string
/// length followed by its bytes. Returns `None` on any structural
/// mismatch so a bad log is skipped instead of poisoning the batch.
pub fn decode_registration(log: &RawLog) -> Option<Record> {
    let data = log.data.strip_prefix("0x").unwrap_or(&log.data);

    let string_offset = word(data, 0).and_then(hex_usize)?;
    let content_hash = format!("0x{}", word(data, 1)?);
    let publisher = format!("0x{}", word(data, 2)?.get(24..)?);
    let timestamp = i64::try_from(word(data, 3).and_then(hex_usize)?).ok()?;

    let len = word_at_byte(data, string_offset).and_then(hex_usize)?;
    let start = (string_offset + 32).checked_mul(2)?;
    let end = start.checked_add(len.checked_mul(2)?)?;
    let content_id = String::from_utf8(decode_hex(data.get(start..end)?)?).ok()?;
    if content_id.is_empty() {
        return None;
    }

    Some(Record {
        content_id,
        content_hash,
        publisher,
        timestamp,
        block_number: log.block_number_u64(),
    })
}

/// The `i`-th 32-byte word of `data` as a 64-char hex slice.
fn word(data: &str, i: usize) -> Option<&str> {
    data.get(i * 64..(i + 1) * 64)
}

/// The 32-byte word starting at byte offset `offset` into the data.
fn word_at_byte(data: &str, offset: usize) -> Option<&str> {
    let start = offset.checked_mul(2)?;
    data.get(start..start + 64)
}

fn hex_usize(s: &str) -> Option<usize> {
    let trimmed = s.trim_start_matches('0');
    if trimmed.is_empty() {
        return Some(0);
    }
    usize::from_str_radix(trimmed, 16).ok()
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // DataRegistered("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG",
    //                0x8a35…d19b, 0xBB1e…5975, 1717171717)
    const ENCODED: &str = "0x00000000000000000000000000000000000000000000000000000000000000808a35acfbc15ff81a39ae7d344fd709f28e8600b4aa8c65c6b64bfe7fe36bd19b000000000000000000000000bb1ee14a27aabe1f2300b4a76e99ef558f355975000000000000000000000000000000000000000000000000000000006659f605000000000000000000000000000000000000000000000000000000000000002e516d597741504a7a7635435a736e4136323573335866326e656d7459675070486457457a37396f6a576e50626447000000000000000000000000000000000000";

    fn raw(data: &str) -> RawLog {
        RawLog {
            address: "0x82ab691cba54eb95e09ac69cc170ab14bbf1299e".into(),
            topics: vec![
                "0x589fb78ac823f5a7e552de8b8d50b3ffe12200275d5d8d483cee2156bb0f99be".into(),
            ],
            data: data.into(),
            block_number: "0x1a2b3c".into(),
            tx_hash: "0xdead".into(),
            removed: None,
        }
    }

    #[test]
    fn decodes_registration_event() {
        let record = decode_registration(&raw(ENCODED)).unwrap();
        assert_eq!(
            record.content_id,
            "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG"
        );
        assert_eq!(
            record.content_hash,
            "0x8a35acfbc15ff81a39ae7d344fd709f28e8600b4aa8c65c6b64bfe7fe36bd19b"
        );
        assert_eq!(
            record.publisher,
            "0xbb1ee14a27aabe1f2300b4a76e99ef558f355975"
        );
        assert_eq!(record.timestamp, 1_717_171_717);
        assert_eq!(record.block_number, 0x1a2b3c);
    }

    #[test]
    fn rejects_truncated_data() {
        assert!(decode_registration(&raw("0x00000000")).is_none());
        // head only, tail missing
        assert!(decode_registration(&raw(&ENCODED[..2 + 4 * 64])).is_none());
    }

    #[test]
    fn rejects_empty_content_id() {
        // Same head, but a zero-length string in the tail.
        let mut data = String::from(ENCODED.get(..2 + 4 * 64).unwrap());
        data.push_str(&"0".repeat(64));
        assert!(decode_registration(&raw(&data)).is_none());
    }

    #[test]
    fn parse_hex_u64_basic() {
        assert_eq!(parse_hex_u64("0x1"), 1);
        assert_eq!(parse_hex_u64("0xff"), 255);
        assert_eq!(parse_hex_u64("1234"), 0x1234);
        assert_eq!(parse_hex_u64("0x"), 0);
    }

    #[test]
    fn removed_flag_defaults_false() {
        let log = raw(ENCODED);
        assert!(!log.is_removed());
        let mut removed = raw(ENCODED);
        removed.removed = Some(true);
        assert!(removed.is_removed());
    }

    #[test]
    fn raw_log_deserializes_rpc_field_names() {
        let json = r#"{
            "address": "0x82ab691cba54eb95e09ac69cc170ab14bbf1299e",
            "topics": ["0x589fb78ac823f5a7e552de8b8d50b3ffe12200275d5d8d483cee2156bb0f99be"],
            "data": "0x",
            "blockNumber": "0x10",
            "transactionHash": "0xbeef",
            "removed": false
        }"#;
        let log: RawLog = serde_json::from_str(json).unwrap();
        assert_eq!(log.block_number_u64(), 16);
        assert_eq!(log.tx_hash, "0xbeef");
    }
}
