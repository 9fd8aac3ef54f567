//! A running environment occupying one slot

use crate::environment::{EnvironmentClass, TierKind};
use crate::naming::{format_environment_name, Rotation};
use crate::version::ParsedVersion;
use serde::{Deserialize, Serialize};

/// One platform environment in one (class, kind) slot.
///
/// The name is always derived from the application, slot and rotation, so
/// there is no constructor taking a free-form name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    pub class: EnvironmentClass,
    pub kind: TierKind,
    pub platform_arn: String,
    /// Version label as reported by the control plane
    pub version_label: Option<String>,
    /// Decomposed label, absent when the label does not follow the grammar
    pub parsed_version: Option<ParsedVersion>,
    /// Control-plane resource id; `None` for a tier that is only planned
    pub resource_id: Option<String>,
    pub name: String,
    pub rotation: Rotation,
}

impl Tier {
    pub fn new(
        application: &str,
        class: EnvironmentClass,
        kind: TierKind,
        rotation: Rotation,
        platform_arn: impl Into<String>,
    ) -> Self {
        Self {
            class,
            kind,
            platform_arn: platform_arn.into(),
            version_label: None,
            parsed_version: None,
            resource_id: None,
            name: format_environment_name(application, class, kind, rotation),
            rotation,
        }
    }

    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    /// Attach a version; the label is parsed when it follows the grammar.
    pub fn with_version_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.parsed_version = ParsedVersion::parse(&label).ok();
        self.version_label = Some(label);
        self
    }

    pub fn with_version(mut self, version: ParsedVersion) -> Self {
        self.version_label = Some(version.version.clone());
        self.parsed_version = Some(version);
        self
    }

    /// A copy of this tier moved to a new rotation and platform.
    ///
    /// The copy has no resource id: it does not exist on the control plane yet.
    pub fn rotated(&self, application: &str, rotation: Rotation, platform_arn: &str) -> Self {
        Self {
            platform_arn: platform_arn.to_string(),
            resource_id: None,
            name: format_environment_name(application, self.class, self.kind, rotation),
            rotation,
            ..self.clone()
        }
    }

    pub fn git_commit(&self) -> Option<&str> {
        self.parsed_version
            .as_ref()
            .and_then(|v| v.git_commit.as_deref())
    }
}
