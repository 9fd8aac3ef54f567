//! Deployment planner
//!
//! [`plan`] derives the next topology of one environment class from the
//! observed one. Without a platform ARN the tiers stay where they are and
//! only their version changes. With one, every tier of the class moves to
//! a single shared rotation so web and worker names stay paired.

use crate::catalog::VersionCatalog;
use crate::error::{Result, StateError};
use safecast_types::{EnvironmentClass, ParsedVersion, Rotation, TopologySnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// What the operator asked for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub class: EnvironmentClass,
    pub new_version: Option<String>,
    /// Platform of the replacement environments; `None` means in place
    pub new_platform_arn: Option<String>,
}

impl PlanRequest {
    pub fn in_place(class: EnvironmentClass, version: impl Into<String>) -> Self {
        Self {
            class,
            new_version: Some(version.into()),
            new_platform_arn: None,
        }
    }

    pub fn blue_green(
        class: EnvironmentClass,
        version: Option<String>,
        platform_arn: impl Into<String>,
    ) -> Self {
        Self {
            class,
            new_version: version,
            new_platform_arn: Some(platform_arn.into()),
        }
    }

    pub fn is_blue_green(&self) -> bool {
        self.new_platform_arn.is_some()
    }
}

/// Plan the next topology; `observed` is left untouched.
pub fn plan(
    observed: &TopologySnapshot,
    catalog: &VersionCatalog,
    request: &PlanRequest,
) -> Result<TopologySnapshot> {
    let version = match &request.new_version {
        Some(label) => {
            catalog.validate(label)?;
            Some(
                ParsedVersion::parse(label)
                    .map_err(|_| StateError::UnparseableVersion(label.clone()))?,
            )
        }
        None => None,
    };

    let current = observed
        .envs
        .get(&request.class)
        .filter(|tiers| !tiers.is_empty())
        .ok_or_else(|| StateError::NoEnvironments {
            application: observed.application.clone(),
            class: request.class,
        })?;

    let planned: BTreeMap<_, _> = match &request.new_platform_arn {
        None => current
            .iter()
            .map(|(kind, tier)| {
                let tier = match &version {
                    Some(v) => tier.clone().with_version(v.clone()),
                    None => tier.clone(),
                };
                (*kind, tier)
            })
            .collect(),
        Some(arn) => {
            let rotation = next_rotation(current.values().map(|t| t.rotation));
            debug!(class = %request.class, rotation = %rotation, "Planned blue-green rotation");
            let planned: BTreeMap<_, _> = current
                .iter()
                .map(|(kind, tier)| {
                    let rotated = tier.rotated(&observed.application, rotation, arn);
                    let rotated = match &version {
                        Some(v) => rotated.with_version(v.clone()),
                        None => rotated,
                    };
                    (*kind, rotated)
                })
                .collect();

            // Tiers that wrapped unevenly can put a live name at the shared rotation.
            if let Some(clash) = planned
                .values()
                .find(|new| current.values().any(|old| old.name == new.name))
            {
                return Err(StateError::NameCollision {
                    name: clash.name.clone(),
                    class: request.class,
                });
            }
            planned
        }
    };

    let mut next = observed.clone();
    next.envs.insert(request.class, planned);
    Ok(next)
}

/// Rotation following the highest one in use.
fn next_rotation(rotations: impl Iterator<Item = Rotation>) -> Rotation {
    rotations
        .max()
        .map(|r| r.next())
        .unwrap_or(Rotation::ZERO)
}
