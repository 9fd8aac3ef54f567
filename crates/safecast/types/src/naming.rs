//! Environment naming grammar
//!
//! An environment name is `safecast<app>-<class>[-wrk]-<NNN>`, where `NNN`
//! is a zero-padded rotation number between 000 and 999. The rotation number
//! is what makes successive generations of the same slot distinct.

use crate::environment::{EnvironmentClass, TierKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const NAME_PREFIX: &str = "safecast";
const ROTATION_MODULUS: u16 = 1000;

/// Three-digit rotation number, wrapping modulo 1000
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Rotation(u16);

impl Rotation {
    pub const ZERO: Rotation = Rotation(0);
    pub const MAX: Rotation = Rotation(ROTATION_MODULUS - 1);

    pub fn new(value: u16) -> Option<Self> {
        (value < ROTATION_MODULUS).then_some(Self(value))
    }

    pub fn value(&self) -> u16 {
        self.0
    }

    /// The rotation that follows this one; 999 wraps to 000.
    pub fn next(&self) -> Self {
        Self((self.0 + 1) % ROTATION_MODULUS)
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

impl TryFrom<u16> for Rotation {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Rotation::new(value).ok_or_else(|| format!("rotation out of range: {value}"))
    }
}

impl From<Rotation> for u16 {
    fn from(rotation: Rotation) -> Self {
        rotation.0
    }
}

/// The slot and generation encoded in an environment name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvironmentSlot {
    pub class: EnvironmentClass,
    pub kind: TierKind,
    pub rotation: Rotation,
}

/// An environment name that does not follow the naming grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized environment name `{name}` for application `{application}`")]
pub struct UnrecognizedName {
    pub application: String,
    pub name: String,
}

/// Format the environment name of a slot generation.
pub fn format_environment_name(
    application: &str,
    class: EnvironmentClass,
    kind: TierKind,
    rotation: Rotation,
) -> String {
    match kind {
        TierKind::Web => format!("{NAME_PREFIX}{application}-{class}-{rotation}"),
        TierKind::Worker => format!("{NAME_PREFIX}{application}-{class}-{kind}-{rotation}"),
    }
}

/// Parse an environment name back into its slot and rotation.
///
/// Names owned by other applications or following older conventions come
/// back as [`UnrecognizedName`] so callers can skip them.
pub fn parse_environment_name(
    application: &str,
    name: &str,
) -> Result<EnvironmentSlot, UnrecognizedName> {
    let unrecognized = || UnrecognizedName {
        application: application.to_string(),
        name: name.to_string(),
    };

    let rest = name
        .strip_prefix(NAME_PREFIX)
        .and_then(|rest| rest.strip_prefix(application))
        .and_then(|rest| rest.strip_prefix('-'))
        .ok_or_else(unrecognized)?;

    let (slot, digits) = rest.rsplit_once('-').ok_or_else(unrecognized)?;
    if digits.len() != 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(unrecognized());
    }
    let rotation = digits
        .parse::<u16>()
        .ok()
        .and_then(Rotation::new)
        .ok_or_else(unrecognized)?;

    let (class, kind) = match slot.split_once('-') {
        None => (slot, TierKind::Web),
        Some((class, kind)) if kind == TierKind::Worker.as_str() => (class, TierKind::Worker),
        Some(_) => return Err(unrecognized()),
    };
    let class = class
        .parse::<EnvironmentClass>()
        .map_err(|_| unrecognized())?;

    Ok(EnvironmentSlot {
        class,
        kind,
        rotation,
    })
}

/// Name of the saved configuration template backing a slot.
pub fn template_name(class: EnvironmentClass, kind: TierKind) -> String {
    match kind {
        TierKind::Web => class.to_string(),
        TierKind::Worker => format!("{class}-{kind}"),
    }
}
