// Input validation and sanitization.
//
// Every mutating operation validates its input here before a single
// command is rendered, so bad requests never reach hardware. These are
// pure functions: no I/O, no device state.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::SwitchError;

static PORT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Ethernet[1-9][0-9]{0,2}(/[1-9][0-9]{0,2})*$").unwrap());
static PORT_NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9][0-9]{0,2}(/[1-9][0-9]{0,2})*$").unwrap());
static PORT_CHANNEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Port-Channel([0-9]+)$").unwrap());
static TRUNK_GROUP_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());
static DESCRIPTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\s_\-/,]+$").unwrap());
static BGP_GROUP_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]*$").unwrap());
static BGP_COMMUNITY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^101:([0-9]{1,5})$").unwrap());
static VLAN_RANGE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)-([0-9]+)$").unwrap());
static SHORT_ET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Et([0-9]+(?:/[0-9]+)*)$").unwrap());
static SHORT_VX_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Vx([0-9]+)$").unwrap());
static SHORT_PO_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Po([0-9]+)$").unwrap());
static MAC_DOTTED_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-fA-F]{4}\.[0-9a-fA-F]{4}\.[0-9a-fA-F]{4}$").unwrap());
static MAC_COLON_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9a-fA-F]{2}:){5}[0-9a-fA-F]{2}$").unwrap());

/// Validate an interface name: `Ethernet<n>[/<n>]*` or `Port-Channel<n>`.
pub fn validate_port_value(port: &str) -> Result<(), SwitchError> {
    if PORT_REGEX.is_match(port) || PORT_CHANNEL_REGEX.is_match(port) {
        return Ok(());
    }
    Err(SwitchError::validation(format!(
        "invalid interface name: {port}"
    )))
}

/// Validate a bare port number like `27/1` or `2` (no `Ethernet` prefix).
pub fn validate_port_number(port: &str) -> Result<(), SwitchError> {
    if PORT_NUMBER_REGEX.is_match(port) {
        return Ok(());
    }
    Err(SwitchError::validation(format!(
        "invalid port number: {port}"
    )))
}

/// Validate a VLAN id against the caller-supplied allow-list.
///
/// An empty allow-list is itself an error: a misconfigured deployment
/// must not silently allow everything (or nothing).
pub fn validate_vlan_value(vlan: u16, allowed_vlans: &[u16]) -> Result<(), SwitchError> {
    if allowed_vlans.is_empty() {
        return Err(SwitchError::validation("no allowed VLANs provided"));
    }
    if allowed_vlans.contains(&vlan) {
        return Ok(());
    }
    Err(SwitchError::validation(format!(
        "VLAN {vlan} not in allowed VLANs given in config"
    )))
}

/// Validate a switchport mode against the caller-supplied allow-list.
pub fn validate_mode_value(mode: &str, allowed_modes: &[String]) -> Result<(), SwitchError> {
    if allowed_modes.iter().any(|m| m == mode) {
        return Ok(());
    }
    Err(SwitchError::validation(format!(
        "mode {mode} is not an allowed mode value"
    )))
}

/// Validate trunk-group names, optionally against an allow-list.
///
/// An empty allow-list means "no restriction" here, unlike VLANs --
/// trunk groups are provider-defined names, not tenant input.
pub fn validate_trunk_groups(
    trunk_groups: &[String],
    allowed_trunk_groups: &[String],
) -> Result<(), SwitchError> {
    for trunk_group in trunk_groups {
        if trunk_group.len() > 32 {
            return Err(SwitchError::validation(format!(
                "trunk group name must be under 32 characters: {trunk_group}"
            )));
        }
        if !TRUNK_GROUP_REGEX.is_match(trunk_group) {
            return Err(SwitchError::validation(format!(
                "invalid trunk group name: {trunk_group}"
            )));
        }
        if !allowed_trunk_groups.is_empty() && !allowed_trunk_groups.contains(trunk_group) {
            return Err(SwitchError::validation(format!(
                "trunk group {trunk_group} not in allowed trunk groups given in config"
            )));
        }
    }
    Ok(())
}

/// Split a comma-separated trunk-group string, trim, sort, and validate.
pub fn split_and_validate_trunk_groups(
    trunk_groups: &str,
    allowed_trunk_groups: &[String],
) -> Result<Vec<String>, SwitchError> {
    if trunk_groups.trim().is_empty() {
        return Err(SwitchError::validation("empty trunk group list"));
    }
    let mut groups: Vec<String> = trunk_groups
        .split(',')
        .map(|g| g.trim().to_string())
        .collect();
    groups.sort();
    validate_trunk_groups(&groups, allowed_trunk_groups)?;
    Ok(groups)
}

/// Validate and sanitize an interface description: allowed characters
/// only, trimmed, at most 100 characters after trimming.
pub fn validate_and_sanitize_description(description: &str) -> Result<String, SwitchError> {
    if !DESCRIPTION_REGEX.is_match(description) {
        return Err(SwitchError::validation(
            "description contains invalid characters",
        ));
    }
    let sanitized = description.trim().to_string();
    if sanitized.len() > 100 {
        return Err(SwitchError::validation("description is too long"));
    }
    Ok(sanitized)
}

/// Validate a BGP community value: integer in [0, 65535].
pub fn validate_bgp_community_value(community: u32) -> Result<(), SwitchError> {
    if community > 65535 {
        return Err(SwitchError::validation(format!(
            "invalid BGP community value: {community}"
        )));
    }
    Ok(())
}

/// Validate a BGP community group name: 1-32 chars, `[A-Za-z0-9_-]`.
pub fn validate_bgp_community_group_name(name: &str) -> Result<(), SwitchError> {
    if name.is_empty() || name.len() > 32 {
        return Err(SwitchError::validation(
            "BGP community group name must be between 1 and 32 characters",
        ));
    }
    if !BGP_GROUP_NAME_REGEX.is_match(name) {
        return Err(SwitchError::validation(
            "BGP community group name must be alphanumeric with - and _",
        ));
    }
    Ok(())
}

/// `300` -> `"101:300"`.
pub fn bgp_community_value_to_string(community: u32) -> Result<String, SwitchError> {
    validate_bgp_community_value(community)?;
    Ok(format!("101:{community}"))
}

/// `"101:300"` -> `300`. The `101:` prefix is the fabric's fixed
/// administrative AS part.
pub fn bgp_community_string_to_value(community: &str) -> Result<u32, SwitchError> {
    let captures = BGP_COMMUNITY_REGEX.captures(community).ok_or_else(|| {
        SwitchError::validation(format!("wrong format for community string {community:?}"))
    })?;
    let value: u32 = captures[1]
        .parse()
        .map_err(|e| SwitchError::validation(format!("bad community number: {e}")))?;
    validate_bgp_community_value(value)?;
    Ok(value)
}

/// Expand a VLAN list with ranges: `"100,110-112,115"` ->
/// `[100, 110, 111, 112, 115]`. A range with start >= end is an error.
pub fn expand_vlan_ranges(series: &str) -> Result<Vec<u16>, SwitchError> {
    let mut vlans = Vec::new();
    for part in series.split(',') {
        if let Some(captures) = VLAN_RANGE_REGEX.captures(part) {
            let start: u16 = captures[1]
                .parse()
                .map_err(|e| SwitchError::validation(format!("bad range start in {part:?}: {e}")))?;
            let end: u16 = captures[2]
                .parse()
                .map_err(|e| SwitchError::validation(format!("bad range end in {part:?}: {e}")))?;
            if start >= end {
                return Err(SwitchError::validation(format!(
                    "got a range with start >= end: {part}"
                )));
            }
            vlans.extend(start..=end);
        } else {
            let vlan: u16 = part
                .parse()
                .map_err(|e| SwitchError::validation(format!("bad VLAN {part:?}: {e}")))?;
            vlans.push(vlan);
        }
    }
    Ok(vlans)
}

/// Convert a short interface name to the canonical long form:
/// `Et1/1` -> `Ethernet1/1`, `Vx1` -> `Vxlan1`, `Po1` -> `Port-Channel1`.
/// Any other short form is an error.
pub fn interface_short_to_long_name(short: &str) -> Result<String, SwitchError> {
    if let Some(captures) = SHORT_ET_REGEX.captures(short) {
        return Ok(format!("Ethernet{}", &captures[1]));
    }
    if let Some(captures) = SHORT_VX_REGEX.captures(short) {
        return Ok(format!("Vxlan{}", &captures[1]));
    }
    if let Some(captures) = SHORT_PO_REGEX.captures(short) {
        return Ok(format!("Port-Channel{}", &captures[1]));
    }
    Err(SwitchError::protocol(format!(
        "short interface name {short:?} did not match known patterns EtX, VxX, PoX"
    )))
}

/// Numeric parts of an Ethernet interface name: `Ethernet27/1` -> (27, 1).
fn ethernet_numbers(name: &str) -> Result<(u32, u32), SwitchError> {
    let rest = name.strip_prefix("Ethernet").ok_or_else(|| {
        SwitchError::validation(format!("not an Ethernet interface: {name}"))
    })?;
    let mut parts = rest.split('/');
    let first: u32 = parts
        .next()
        .unwrap_or_default()
        .parse()
        .map_err(|e| SwitchError::validation(format!("bad interface number in {name}: {e}")))?;
    let second: u32 = match parts.next() {
        Some(p) => p
            .parse()
            .map_err(|e| SwitchError::validation(format!("bad interface number in {name}: {e}")))?,
        None => 0,
    };
    Ok((first, second))
}

/// Sort Ethernet interface names numerically and return the device range
/// expression `first-last` (or just the name when there is one interface).
pub fn get_interface_range(interfaces: &[String]) -> Result<String, SwitchError> {
    if interfaces.is_empty() {
        return Err(SwitchError::validation("no Ethernet interfaces found"));
    }

    let mut keyed: Vec<((u32, u32), &String)> = Vec::with_capacity(interfaces.len());
    for name in interfaces {
        keyed.push((ethernet_numbers(name)?, name));
    }
    keyed.sort_by_key(|(key, _)| *key);

    if keyed.len() == 1 {
        return Ok(keyed[0].1.clone());
    }
    Ok(format!("{}-{}", keyed[0].1, keyed[keyed.len() - 1].1))
}

/// Like [`get_interface_range`] but in the bare number form some
/// commands take after an `ethernet` keyword: `["Ethernet3",
/// "Ethernet1/1"]` -> `"1/1-3"`.
pub fn get_port_number_range(interfaces: &[String]) -> Result<String, SwitchError> {
    if interfaces.is_empty() {
        return Err(SwitchError::validation("no Ethernet interfaces found"));
    }

    let mut keyed: Vec<((u32, u32), &str)> = Vec::with_capacity(interfaces.len());
    for name in interfaces {
        let numbers = ethernet_numbers(name)?;
        let bare = name.strip_prefix("Ethernet").unwrap_or(name);
        keyed.push((numbers, bare));
    }
    keyed.sort_by_key(|(key, _)| *key);

    if keyed.len() == 1 {
        return Ok(keyed[0].1.to_string());
    }
    Ok(format!("{}-{}", keyed[0].1, keyed[keyed.len() - 1].1))
}

/// Normalize a MAC address to colon-separated canonical form.
/// Accepts `xxxx.xxxx.xxxx` (device format) and `xx:xx:xx:xx:xx:xx`.
pub fn normalize_mac(mac: &str) -> Option<String> {
    if MAC_COLON_REGEX.is_match(mac) {
        return Some(mac.to_lowercase());
    }
    if MAC_DOTTED_REGEX.is_match(mac) {
        let hex: String = mac.chars().filter(|c| *c != '.').collect();
        let pairs: Vec<String> = hex
            .as_bytes()
            .chunks(2)
            .map(|pair| String::from_utf8_lossy(pair).to_lowercase())
            .collect();
        return Some(pairs.join(":"));
    }
    None
}

/// Validate a port-channel interface name like `Port-Channel67`.
pub fn validate_port_channel_name(name: &str) -> Result<(), SwitchError> {
    if PORT_CHANNEL_REGEX.is_match(name) {
        return Ok(());
    }
    Err(SwitchError::validation(format!(
        "invalid Port-Channel name: {name}"
    )))
}

/// Validate a port-channel number (1..=999999).
pub fn validate_port_channel_number(number: u32) -> Result<(), SwitchError> {
    if number == 0 || number > 999_999 {
        return Err(SwitchError::validation(format!(
            "invalid port channel number: {number}"
        )));
    }
    Ok(())
}

/// `24` -> `"Port-Channel24"`.
pub fn port_channel_number_to_interface_name(number: u32) -> Result<String, SwitchError> {
    validate_port_channel_number(number)?;
    Ok(format!("Port-Channel{number}"))
}

/// `"Port-Channel24"` -> `24`.
pub fn port_channel_interface_name_to_number(name: &str) -> Result<u32, SwitchError> {
    let captures = PORT_CHANNEL_REGEX.captures(name).ok_or_else(|| {
        SwitchError::validation(format!("invalid Port-Channel name: {name}"))
    })?;
    captures[1]
        .parse()
        .map_err(|e| SwitchError::validation(format!("bad port channel number in {name}: {e}")))
}
