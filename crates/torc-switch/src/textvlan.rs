// ── Text VLAN fallback parser ──
//
// Older firmware rejects `show interfaces vlans` under json encoding
// ("unconverted command"); the same query under text encoding returns a
// fixed-width table:
//
//   Port       Untagged Tagged
//   Et1        1        -
//   Et2        123      1,456
//   Et3        None     1000-1002,
//              2000
//
// A row with only two columns is a wrapped continuation: its first
// token is a tagged-VLAN list belonging to the previous interface.
// The output shape matches the structured decoder so both paths feed
// the same projection.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::SwitchError;
use crate::response::{InterfaceVlans, ShowInterfacesVlans};
use crate::validate::{expand_vlan_ranges, interface_short_to_long_name};

static SPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(" +").unwrap());

fn parse_tagged(cell: &str) -> Result<Vec<u16>, SwitchError> {
    if cell == "-" {
        return Ok(Vec::new());
    }
    // Wrapped lines can leave a trailing comma on the first fragment.
    let cell = cell.trim_end_matches(',');
    expand_vlan_ranges(cell)
        .map_err(|e| SwitchError::protocol(format!("bad tagged VLAN list {cell:?}: {e}")))
}

/// Decode the legacy text table into the structured VLAN document shape.
pub fn parse_text_vlans(output: &str) -> Result<ShowInterfacesVlans, SwitchError> {
    let mut doc = ShowInterfacesVlans::default();
    let mut current_interface: Option<String> = None;

    for line in output.lines().skip(1) {
        if line.is_empty() {
            continue;
        }
        let line = SPACE_RUNS.replace_all(line.trim_end(), " ");
        let columns: Vec<&str> = line.trim().split(' ').collect();

        match columns.as_slice() {
            [name, untagged, tagged] => {
                let long_name = interface_short_to_long_name(name)?;
                let mut vlans = InterfaceVlans::default();
                if *untagged != "None" {
                    vlans.untagged_vlan = untagged.parse().map_err(|e| {
                        SwitchError::protocol(format!(
                            "could not parse untagged VLAN {untagged:?}: {e}"
                        ))
                    })?;
                }
                vlans.tagged_vlans = parse_tagged(tagged)?;
                doc.interfaces.insert(long_name.clone(), vlans);
                current_interface = Some(long_name);
            }
            [tagged] => {
                // Continuation row: extend the previous interface.
                let name = current_interface.as_ref().ok_or_else(|| {
                    SwitchError::protocol(format!(
                        "continuation row {tagged:?} before any interface row"
                    ))
                })?;
                let extra = parse_tagged(tagged)?;
                if let Some(entry) = doc.interfaces.get_mut(name) {
                    entry.tagged_vlans.extend(extra);
                }
            }
            [tagged, more] => {
                // Two-column continuation where the wrap split the list.
                let name = current_interface.as_ref().ok_or_else(|| {
                    SwitchError::protocol(format!(
                        "continuation row {tagged:?} before any interface row"
                    ))
                })?;
                let mut extra = parse_tagged(tagged)?;
                extra.extend(parse_tagged(more)?);
                if let Some(entry) = doc.interfaces.get_mut(name) {
                    entry.tagged_vlans.extend(extra);
                }
            }
            _ => {
                return Err(SwitchError::protocol(format!(
                    "unexpected row shape in VLAN table: {line:?}"
                )));
            }
        }
    }

    Ok(doc)
}
