//
//  devops-client
//  output/json.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # JSON Output Formatting
//!
//! Pretty-printed JSON for `--json`. Shaped responses serialize their timestamps
//! back to RFC 3339, so output can be piped to `jq` unchanged.

use serde::Serialize;
use std::io::{self, Write};

/// Writes `value` as pretty-printed JSON to stdout.
pub fn write_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_json_to(&mut handle, value)
}

/// Writes `value` as pretty-printed JSON followed by a newline.
pub fn write_json_to<W: Write, T: Serialize + ?Sized>(
    writer: &mut W,
    value: &T,
) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ShapedValue;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    #[test]
    fn test_shaped_timestamp_written_as_rfc3339() {
        let mut fields = BTreeMap::new();
        fields.insert(
            "queueTime".to_string(),
            ShapedValue::DateTime(Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap()),
        );

        let mut buffer = Vec::new();
        write_json_to(&mut buffer, &ShapedValue::Object(fields)).unwrap();
        let written = String::from_utf8(buffer).unwrap();

        assert!(written.contains("\"queueTime\": \"2024-05-01T08:30:00Z\""));
        assert!(written.ends_with('\n'));
    }
}
