//! Plan inspection artifact
//!
//! Serializes an [`UpdatePlan`] to `.beztack/inspect/data.json` for external
//! viewers. The JSON shape is the plan's public serde form; rendering it is
//! somebody else's job.

use beztack_fs::{ControlPath, NormalizedPath, io};

use crate::plan::UpdatePlan;
use crate::Result;

/// Write the serialized plan under the workspace's inspect directory and
/// return the written path.
pub fn write_report(root: &NormalizedPath, plan: &UpdatePlan) -> Result<NormalizedPath> {
    let path = root
        .join(ControlPath::BeztackDir.as_str())
        .join(ControlPath::InspectDir.as_str())
        .join("data.json");
    let content = serde_json::to_string_pretty(plan)?;
    io::write_atomic(&path, content.as_bytes())?;
    Ok(path)
}
