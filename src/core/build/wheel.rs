//! Installed distribution inspection.
//!
//! After installation every distribution in the workspace has a
//! `<name>-<version>.dist-info/WHEEL` file listing the compatibility tags it
//! was built for. Checking those tags against the [`Target`] is what keeps
//! host-platform binaries out of the artifact.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use super::manifest::normalize_name;
use crate::core::domain::Target;
use crate::error::{BuildError, Result};

/// A distribution found in the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledDist {
    /// Normalized distribution name.
    pub name: String,
    pub version: String,
    pub dist_info: PathBuf,
    /// Compatibility tags from the `WHEEL` file, e.g. `cp312-cp312-manylinux_2_17_x86_64`.
    pub tags: Vec<String>,
}

/// List the distributions installed at the top level of `dir`.
pub fn installed(dir: &Path) -> Result<Vec<InstalledDist>> {
    let mut dists = Vec::new();

    for entry in fs::read_dir(dir).map_err(BuildError::io("read", dir))? {
        let entry = entry.map_err(BuildError::io("read", dir))?;
        let path = entry.path();

        let Some(stem) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(".dist-info"))
        else {
            continue;
        };
        if !path.is_dir() {
            continue;
        }

        let (name, version) = stem.rsplit_once('-').unwrap_or((stem, ""));
        let tags = read_tags(&path.join("WHEEL"))?;
        trace!(name = %name, version = %version, tags = ?tags, "found distribution");

        dists.push(InstalledDist {
            name: normalize_name(name),
            version: version.to_string(),
            dist_info: path,
            tags,
        });
    }

    dists.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(dists)
}

fn read_tags(wheel_file: &Path) -> Result<Vec<String>> {
    if !wheel_file.exists() {
        return Ok(Vec::new());
    }
    let contents = fs::read_to_string(wheel_file).map_err(BuildError::io("read", wheel_file))?;

    Ok(contents
        .lines()
        .filter_map(|l| l.strip_prefix("Tag:"))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect())
}

/// Fail unless every distribution has at least one tag the target supports.
pub fn verify(dists: &[InstalledDist], target: &Target) -> Result<()> {
    for dist in dists {
        if !dist.tags.iter().any(|tag| tag_supported(tag, target)) {
            return Err(BuildError::PlatformMismatch {
                package: format!("{} {}", dist.name, dist.version),
                platform: target.platform.clone(),
                runtime: target.runtime_version.clone(),
                tags: if dist.tags.is_empty() {
                    "none".to_string()
                } else {
                    dist.tags.join(", ")
                },
            }
            .into());
        }
    }

    debug!(distributions = dists.len(), target = %target, "platform tags verified");
    Ok(())
}

/// Whether a (possibly compressed) wheel tag runs on `target`.
pub fn tag_supported(tag: &str, target: &Target) -> bool {
    let Some((major, minor)) = target.version() else {
        return false;
    };

    let mut parts = tag.splitn(3, '-');
    let (Some(interpreters), Some(abis), Some(platforms)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let python_ok = interpreters.split('.').any(|interp| {
        abis.split('.')
            .any(|abi| python_supported(interp, abi, major, minor))
    });

    python_ok
        && platforms
            .split('.')
            .any(|p| platform_supported(p, &target.platform))
}

/// Split `cp312` into (`cp`, 3, Some(12)) and `py3` into (`py`, 3, None).
fn parse_interpreter(tag: &str) -> Option<(&str, u32, Option<u32>)> {
    let digits_at = tag.find(|c: char| c.is_ascii_digit())?;
    let (implementation, digits) = tag.split_at(digits_at);
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let major = digits[..1].parse().ok()?;
    let minor = if digits.len() > 1 {
        Some(digits[1..].parse().ok()?)
    } else {
        None
    };
    Some((implementation, major, minor))
}

fn python_supported(interp: &str, abi: &str, major: u32, minor: u32) -> bool {
    let Some((implementation, tag_major, tag_minor)) = parse_interpreter(interp) else {
        return false;
    };
    if tag_major != major {
        return false;
    }

    match abi {
        // Pure Python, or a generic `py3x` tag no newer than the target
        "none" => match implementation {
            "py" => tag_minor.map_or(true, |m| m <= minor),
            "cp" => tag_minor == Some(minor),
            _ => false,
        },
        // Stable ABI: any CPython at or above the build version
        "abi3" => implementation == "cp" && tag_minor.is_some_and(|m| m <= minor),
        // Version-specific CPython ABI
        _ => implementation == "cp" && tag_minor == Some(minor) && abi == interp,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    /// glibc Linux, with the newest glibc the platform guarantees (if known)
    Glibc(Option<(u32, u32)>),
    Musl(u32, u32),
    MacOs,
    Windows,
}

/// Split a platform tag into its OS family and architecture.
fn parse_platform(tag: &str) -> Option<(Family, &str)> {
    fn versioned(rest: &str) -> Option<(u32, u32, &str)> {
        let mut parts = rest.splitn(3, '_');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        Some((major, minor, parts.next()?))
    }

    if let Some(rest) = tag.strip_prefix("manylinux_") {
        let (major, minor, arch) = versioned(rest)?;
        return Some((Family::Glibc(Some((major, minor))), arch));
    }
    for (legacy, glibc) in [
        ("manylinux1_", (2, 5)),
        ("manylinux2010_", (2, 12)),
        ("manylinux2014_", (2, 17)),
    ] {
        if let Some(arch) = tag.strip_prefix(legacy) {
            return Some((Family::Glibc(Some(glibc)), arch));
        }
    }
    if let Some(arch) = tag.strip_prefix("linux_") {
        return Some((Family::Glibc(None), arch));
    }
    if let Some(rest) = tag.strip_prefix("musllinux_") {
        let (major, minor, arch) = versioned(rest)?;
        return Some((Family::Musl(major, minor), arch));
    }
    if let Some(rest) = tag.strip_prefix("macosx_") {
        let (_, _, arch) = versioned(rest)?;
        return Some((Family::MacOs, arch));
    }
    if tag == "win32" {
        return Some((Family::Windows, "x86"));
    }
    if let Some(arch) = tag.strip_prefix("win_") {
        return Some((Family::Windows, arch));
    }
    None
}

fn platform_supported(wheel: &str, target: &str) -> bool {
    if wheel == "any" || wheel == target {
        return true;
    }

    let (Some((wheel_family, wheel_arch)), Some((target_family, target_arch))) =
        (parse_platform(wheel), parse_platform(target))
    else {
        return false;
    };
    if wheel_arch != target_arch {
        return false;
    }

    match (wheel_family, target_family) {
        // A bare linux_* wheel was built against an unknown libc
        (Family::Glibc(None), _) => false,
        (Family::Glibc(Some(_)), Family::Glibc(None)) => true,
        (Family::Glibc(Some(needed)), Family::Glibc(Some(available))) => needed <= available,
        (Family::Musl(a, b), Family::Musl(c, d)) => (a, b) <= (c, d),
        (Family::MacOs, Family::MacOs) | (Family::Windows, Family::Windows) => true,
        _ => false,
    }
}
