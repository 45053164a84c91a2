use std::{
    fs,
    path::{Path, PathBuf},
};

use alloy_primitives::Address;
use anyhow::{Context, Result};
use multisig_wallet_types::SignedOperation;
use serde_json::{json, Value};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

/// Write a signed operation for hand-off to the executing co-signer.
///
/// The `operation` object is the transport record; the rest is audit metadata.
pub fn write_signed_operation(path: &Path, signed: &SignedOperation, proposer: Address) -> Result<()> {
    let now = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    let root = json!({
        "signed_at": now,
        "proposer": proposer.to_string(),
        "operation": serde_json::to_value(signed).context("failed serialising signed operation")?,
    });

    write_json_atomic(path, &root)
}

/// Read back a file produced by [`write_signed_operation`].
pub fn read_signed_operation(path: &Path) -> Result<SignedOperation> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))?;
    let root: Value =
        serde_json::from_str(&raw).with_context(|| format!("failed parsing JSON in {}", path.display()))?;
    let operation = root.get("operation").cloned().unwrap_or(root);
    serde_json::from_value(operation).with_context(|| format!("malformed signed operation in {}", path.display()))
}

fn write_json_atomic(path: &Path, value: &Value) -> Result<()> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    if !parent.exists() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }

    let serialised = serde_json::to_string_pretty(value).context("failed serialising signed operation JSON")?;
    let tmp_path = tmp_path_for(path);
    fs::write(&tmp_path, serialised.as_bytes())
        .with_context(|| format!("failed writing temp file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("failed replacing {}", path.display()))?;
    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
