//! Reconciliation Engine
//!
//! Compares the desired state of a logical volume with what the reports
//! show and picks exactly one [`Action`]. Pure decision logic: nothing in
//! here runs a command.

use crate::domain::ports::{
    Action, DesiredState, LogicalVolumeFacts, NoOpReason, Presence, VolumeGroupFacts,
    VolumeLayout,
};
use crate::error::{Error, Result};
use crate::lvm::size::target_size;

/// Choose the single action that moves `observed` towards `desired`.
///
/// A policy difference always wins over a size difference; the pending
/// resize is picked up by the next run. Sizes are only ever grown.
pub fn plan(
    desired: &DesiredState,
    group: &VolumeGroupFacts,
    observed: Option<&LogicalVolumeFacts>,
) -> Result<Action> {
    match (desired.presence, observed) {
        (Presence::Absent, None) => Ok(Action::NoOp {
            reason: NoOpReason::AlreadyAbsent,
        }),
        (Presence::Absent, Some(_)) => Ok(Action::Delete),
        (Presence::Present, None) => plan_create(desired, group),
        (Presence::Present, Some(volume)) => plan_update(desired, group, volume),
    }
}

fn plan_create(desired: &DesiredState, group: &VolumeGroupFacts) -> Result<Action> {
    let size = desired.size.as_deref().ok_or_else(|| Error::MissingSize {
        volume: desired.volume_name.clone(),
    })?;
    let size_megabytes = target_size(size, group.allocation_unit_size)?;

    if size_megabytes > group.free_capacity {
        return Err(Error::InsufficientSpace {
            group: group.name.clone(),
            requested: size_megabytes,
            free: group.free_capacity,
        });
    }

    Ok(Action::Create(VolumeLayout {
        size_megabytes,
        volume_type: desired.volume_type.clone(),
        copies: desired.copies,
        policy: desired.policy,
        options: desired.extra_options.clone(),
        physical_volumes: desired.physical_volumes.clone(),
    }))
}

fn plan_update(
    desired: &DesiredState,
    group: &VolumeGroupFacts,
    volume: &LogicalVolumeFacts,
) -> Result<Action> {
    if volume.policy != desired.policy {
        return Ok(Action::ChangePolicy {
            policy: desired.policy,
        });
    }

    if volume.group_name != desired.group_name {
        return Err(Error::GroupMismatch {
            volume: desired.volume_name.clone(),
            group: volume.group_name.clone(),
        });
    }

    let Some(size) = desired.size.as_deref() else {
        return Ok(Action::NoOp {
            reason: NoOpReason::AlreadyExists,
        });
    };

    // the group's partition size is trusted for the volume as well
    let target = target_size(size, group.allocation_unit_size)?;

    match target.cmp(&volume.size) {
        std::cmp::Ordering::Greater => Ok(Action::Resize {
            delta_megabytes: target - volume.size,
            target_megabytes: target,
        }),
        std::cmp::Ordering::Less => Err(Error::ShrinkNotPermitted {
            volume: desired.volume_name.clone(),
            current: volume.size,
            requested: target,
        }),
        std::cmp::Ordering::Equal => Ok(Action::NoOp {
            reason: NoOpReason::SizeMatches {
                size_megabytes: target,
            },
        }),
    }
}
