//! Test fixtures and constants.

use std::path::Path;

/// Config with a file store and a secret, but no `[build]` section.
pub const SECRET_CONFIG: &str = r#"
[store]
backend = "file"

[secret]
name = "ingestion/api-token"
description = "API token for the ingestion service"
recovery_window_days = 0
length = 40

[secret.tags]
service = "ingestion"
"#;

/// A minimal function handler.
pub const HANDLER_SOURCE: &str = "def handler(event, context):\n    return {\"ok\": True}\n";

/// Stand-in for pip.
///
/// Installs every requirement as an empty package with a `WHEEL` file tagged
/// `$FAKE_PIP_TAG` (default `py3-none-any`). A requirement named
/// `unavailable` fails the install with exit status 3.
pub const FAKE_PIP_SCRIPT: &str = r#"#!/bin/sh
target=""
req=""
while [ $# -gt 0 ]; do
  case "$1" in
    --target) target="$2"; shift 2 ;;
    --requirement) req="$2"; shift 2 ;;
    *) shift ;;
  esac
done
tag="${FAKE_PIP_TAG:-py3-none-any}"
grep -v '^[[:space:]]*#' "$req" | while read -r line; do
  [ -z "$line" ] && continue
  name=$(echo "$line" | sed 's/[=<>!~ ;[].*//')
  if [ "$name" = "unavailable" ]; then
    echo "ERROR: No matching distribution found for unavailable" >&2
    exit 3
  fi
  mkdir -p "$target/$name" "$target/$name-1.0.dist-info"
  echo "VERSION = '1.0'" > "$target/$name/__init__.py"
  printf 'Wheel-Version: 1.0\nTag: %s\n' "$tag" > "$target/$name-1.0.dist-info/WHEEL"
done
"#;

/// Full config building `lambda/` into `out.zip` with the given installer.
pub fn build_config(installer: &Path) -> String {
    format!(
        r#"{SECRET_CONFIG}
[build]
source_root = "lambda"
include = ["index.py", "events", "services", "utils"]
platform = "linux_x86_64"
runtime_version = "3.12"
output = "../out.zip"
installer = ["{}"]
"#,
        installer.display()
    )
}
