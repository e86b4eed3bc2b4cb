//! Report Parsing
//!
//! Turns the free-text output of `lsvg <vg>` and `lslv <lv>` into
//! [`VolumeGroupFacts`] and [`LogicalVolumeFacts`].
//!
//! Each report kind has a field-extraction table: an ordered list of
//! patterns with the field each one sets. Every line is offered to the
//! table and the first matching rule wins. Fields accumulate on a partial
//! record whose unset fields stay `None`; the record is only turned into
//! facts once the whole report has been read.

use crate::domain::ports::{LogicalVolumeFacts, PlacementPolicy, VolumeGroupFacts};
use crate::error::{Error, Result};
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::{debug, trace};

// =============================================================================
// Field Extraction Table
// =============================================================================

/// One row of an extraction table
struct FieldRule<R> {
    field: &'static str,
    pattern: Regex,
    apply: fn(&mut R, &Captures<'_>),
}

impl<R> FieldRule<R> {
    fn new(field: &'static str, pattern: &str, apply: fn(&mut R, &Captures<'_>)) -> Self {
        Self {
            field,
            pattern: Regex::new(pattern).expect("report field patterns are valid regexes"),
            apply,
        }
    }
}

/// Offer every line to the table, applying the first rule that matches
fn extract<R>(text: &str, rules: &[FieldRule<R>], record: &mut R) {
    for line in text.lines() {
        let hit = rules
            .iter()
            .find_map(|rule| rule.pattern.captures(line).map(|caps| (rule, caps)));
        if let Some((rule, caps)) = hit {
            trace!(field = rule.field, line, "matched report field");
            (rule.apply)(record, &caps);
        }
    }
}

fn number(caps: &Captures<'_>, group: usize) -> Option<u64> {
    caps.get(group).and_then(|m| m.as_str().parse().ok())
}

fn text(caps: &Captures<'_>, group: usize) -> Option<String> {
    caps.get(group).map(|m| m.as_str().to_string())
}

// =============================================================================
// Volume Group Report
// =============================================================================

/// Partially parsed `lsvg` report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolumeGroupReport {
    pub name: Option<String>,
    pub total_capacity: Option<u64>,
    pub free_capacity: Option<u64>,
    pub allocation_unit_size: Option<u64>,
}

type GroupRule = FieldRule<VolumeGroupReport>;

static VOLUME_GROUP_RULES: LazyLock<Vec<GroupRule>> = LazyLock::new(|| {
    vec![
        GroupRule::new("VOLUME GROUP", r"VOLUME GROUP:\s+(\w+)", |r, c| {
            r.name = text(c, 1)
        }),
        GroupRule::new("TOTAL PPs", r"TOTAL PP.*\((\d+)", |r, c| {
            r.total_capacity = number(c, 1)
        }),
        GroupRule::new("PP SIZE", r"PP SIZE:\s+(\d+)", |r, c| {
            r.allocation_unit_size = number(c, 1)
        }),
        GroupRule::new("FREE PPs", r"FREE PP.*\((\d+)", |r, c| {
            r.free_capacity = number(c, 1)
        }),
    ]
});

impl VolumeGroupReport {
    /// Read every recognised field out of a report
    pub fn scan(report: &str) -> Self {
        let mut record = Self::default();
        extract(report, &VOLUME_GROUP_RULES, &mut record);
        record
    }

    /// Finalize the record.
    ///
    /// `Ok(None)` means the report never named a group, which callers treat
    /// as a group that does not exist.
    pub fn finish(self) -> Result<Option<VolumeGroupFacts>> {
        let Some(name) = self.name else {
            return Ok(None);
        };
        let missing = |field| Error::IncompleteReport {
            report: "volume group",
            name: name.clone(),
            field,
        };

        let allocation_unit_size = self
            .allocation_unit_size
            .filter(|size| *size > 0)
            .ok_or_else(|| missing("PP SIZE"))?;
        let total_capacity = self.total_capacity.ok_or_else(|| missing("TOTAL PPs"))?;
        let free_capacity = self.free_capacity.ok_or_else(|| missing("FREE PPs"))?;

        Ok(Some(VolumeGroupFacts {
            name,
            total_capacity,
            free_capacity,
            allocation_unit_size,
        }))
    }
}

/// Parse an `lsvg <vg>` report
pub fn parse_volume_group(report: &str) -> Result<Option<VolumeGroupFacts>> {
    let facts = VolumeGroupReport::scan(report).finish()?;
    debug!(?facts, "parsed volume group report");
    Ok(facts)
}

// =============================================================================
// Logical Volume Report
// =============================================================================

/// Partially parsed `lslv` report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogicalVolumeReport {
    pub name: Option<String>,
    pub group_name: Option<String>,
    pub logical_partitions: Option<u64>,
    pub allocation_unit_size: Option<u64>,
    pub policy: Option<String>,
}

type VolumeRule = FieldRule<LogicalVolumeReport>;

static LOGICAL_VOLUME_RULES: LazyLock<Vec<VolumeRule>> =
    LazyLock::new(|| {
        vec![
            VolumeRule::new(
                "LOGICAL VOLUME",
                r"LOGICAL VOLUME:\s+(\w+)\s+VOLUME GROUP:\s+(\w+)",
                |r, c| {
                    r.name = text(c, 1);
                    r.group_name = text(c, 2);
                },
            ),
            VolumeRule::new("LPs", r"LPs:\s+(\d+).*PPs", |r, c| {
                r.logical_partitions = number(c, 1)
            }),
            VolumeRule::new("PP SIZE", r"PP SIZE:\s+(\d+)", |r, c| {
                r.allocation_unit_size = number(c, 1)
            }),
            VolumeRule::new("INTER-POLICY", r"INTER-POLICY:\s+(\w+)", |r, c| {
                r.policy = text(c, 1)
            }),
        ]
    });

impl LogicalVolumeReport {
    /// Read every recognised field out of a report
    pub fn scan(report: &str) -> Self {
        let mut record = Self::default();
        extract(report, &LOGICAL_VOLUME_RULES, &mut record);
        record
    }

    /// Finalize the record; `Ok(None)` means no such volume
    pub fn finish(self) -> Result<Option<LogicalVolumeFacts>> {
        let Some(name) = self.name else {
            return Ok(None);
        };
        let missing = |field| Error::IncompleteReport {
            report: "logical volume",
            name: name.clone(),
            field,
        };

        let group_name = self.group_name.ok_or_else(|| missing("VOLUME GROUP"))?;
        let logical_partitions = self.logical_partitions.ok_or_else(|| missing("LPs"))?;
        let allocation_unit_size = self
            .allocation_unit_size
            .ok_or_else(|| missing("PP SIZE"))?;
        let policy = self
            .policy
            .as_deref()
            .and_then(|token| token.parse::<PlacementPolicy>().ok())
            .ok_or_else(|| missing("INTER-POLICY"))?;
        let size = logical_partitions
            .checked_mul(allocation_unit_size)
            .ok_or_else(|| Error::InvalidReport {
                report: "logical volume",
                name: name.clone(),
                field: "LPs",
            })?;

        Ok(Some(LogicalVolumeFacts {
            name,
            group_name,
            size,
            policy,
        }))
    }
}

/// Parse an `lslv <lv>` report
pub fn parse_logical_volume(report: &str) -> Result<Option<LogicalVolumeFacts>> {
    let facts = LogicalVolumeReport::scan(report).finish()?;
    debug!(?facts, "parsed logical volume report");
    Ok(facts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const LSVG_DATAVG: &str = "\
VOLUME GROUP:       datavg                   VG IDENTIFIER:  00f6f5d000004c000000016d3c3e0a3d
VG STATE:           active                   PP SIZE:        4 megabyte(s)
VG PERMISSION:      read/write               TOTAL PPs:      2542 (10168 megabytes)
MAX LVs:            256                      FREE PPs:       1000 (4000 megabytes)
LVs:                3                        USED PPs:       1542 (6168 megabytes)
OPEN LVs:           2                        QUORUM:         2 (Enabled)
TOTAL PVs:          1                        VG DESCRIPTORS: 2
";

    const LSLV_TESTLV: &str = "\
LOGICAL VOLUME:     testlv                 VOLUME GROUP:   datavg
LV IDENTIFIER:      00f6f5d000004c000000016d3c3e0a3d.3 PERMISSION:     read/write
VG STATE:           active/complete        LV STATE:       closed/syncd
TYPE:               jfs2                   WRITE VERIFY:   off
MAX LPs:            512                    PP SIZE:        4 megabyte(s)
COPIES:             1                      SCHED POLICY:   parallel
LPs:                128                    PPs:            128
STALE PPs:          0                      BB POLICY:      relocatable
INTER-POLICY:       minimum                RELOCATABLE:    yes
INTRA-POLICY:       middle                 UPPER BOUND:    32
MOUNT POINT:        N/A                    LABEL:          None
";

    #[test]
    fn test_parse_volume_group() {
        let facts = parse_volume_group(LSVG_DATAVG).unwrap().unwrap();
        assert_eq!(facts.name, "datavg");
        assert_eq!(facts.allocation_unit_size, 4);
        assert_eq!(facts.total_capacity, 10168);
        assert_eq!(facts.free_capacity, 4000);
    }

    #[test]
    fn test_volume_group_fields_are_order_independent() {
        let reordered = "\
MAX LVs: 256   FREE PPs: 10 (640 megabytes)
VG STATE: active   PP SIZE: 64 megabyte(s)
VOLUME GROUP: appvg
VG PERMISSION: read/write   TOTAL PPs: 20 (1280 megabytes)
";
        let facts = parse_volume_group(reordered).unwrap().unwrap();
        assert_eq!(facts.name, "appvg");
        assert_eq!(facts.allocation_unit_size, 64);
        assert_eq!(facts.free_capacity, 640);
        assert_eq!(facts.total_capacity, 1280);
    }

    #[test]
    fn test_volume_group_without_name_is_absent() {
        assert_eq!(parse_volume_group("").unwrap(), None);
        assert_eq!(
            parse_volume_group("0516-306 lsvg: Unable to find volume group nonvg in the Device\n")
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_volume_group_missing_fields_stay_unset() {
        let record = VolumeGroupReport::scan("VOLUME GROUP: datavg\nTOTAL PPs: 10 (40 megabytes)\n");
        assert_eq!(record.name.as_deref(), Some("datavg"));
        assert_eq!(record.total_capacity, Some(40));
        assert_eq!(record.free_capacity, None);
        assert_eq!(record.allocation_unit_size, None);

        assert_matches!(
            record.finish(),
            Err(Error::IncompleteReport { field: "PP SIZE", .. })
        );
    }

    #[test]
    fn test_volume_group_zero_partition_size_rejected() {
        let report = "VOLUME GROUP: datavg\nPP SIZE: 0 megabyte(s)\nTOTAL PPs: 1 (0 megabytes)\nFREE PPs: 1 (0 megabytes)\n";
        assert_matches!(
            parse_volume_group(report),
            Err(Error::IncompleteReport { field: "PP SIZE", .. })
        );
    }

    #[test]
    fn test_parse_logical_volume() {
        let facts = parse_logical_volume(LSLV_TESTLV).unwrap().unwrap();
        assert_eq!(facts.name, "testlv");
        assert_eq!(facts.group_name, "datavg");
        assert_eq!(facts.size, 512);
        assert_eq!(facts.policy, PlacementPolicy::Minimum);
    }

    #[test]
    fn test_max_lps_line_is_not_partition_count() {
        let record = LogicalVolumeReport::scan("MAX LPs:            512                    PP SIZE:        4 megabyte(s)\n");
        assert_eq!(record.logical_partitions, None);
        assert_eq!(record.allocation_unit_size, Some(4));
    }

    #[test]
    fn test_logical_volume_absent() {
        assert_eq!(parse_logical_volume("").unwrap(), None);
        assert_eq!(
            parse_logical_volume("0516-1201 lslv: Warning: Volume group name not found\n").unwrap(),
            None
        );
    }

    #[test]
    fn test_logical_volume_size_overflow_rejected() {
        let report = LSLV_TESTLV.replace("LPs:                128", "LPs:                18446744073709551615");
        assert_matches!(
            parse_logical_volume(&report),
            Err(Error::InvalidReport { field: "LPs", .. })
        );
    }

    #[test]
    fn test_logical_volume_unknown_policy() {
        let report = LSLV_TESTLV.replace("INTER-POLICY:       minimum", "INTER-POLICY:       striped");
        assert_matches!(
            parse_logical_volume(&report),
            Err(Error::IncompleteReport { field: "INTER-POLICY", .. })
        );
    }
}
