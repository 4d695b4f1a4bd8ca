use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// A bridge sub-resource that can be polled.
///
/// The lower-cased variant name is the path segment in
/// `/api/{username}/{resource}`, and it is also the key for every piece of
/// per-type poller state.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Lights,
    Groups,
    Scenes,
    Sensors,
    Rules,
    Config,
    Schedules,
}

impl ResourceType {
    /// Every resource type, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Lights,
        Self::Groups,
        Self::Scenes,
        Self::Sensors,
        Self::Rules,
        Self::Config,
        Self::Schedules,
    ];

    /// The URL path segment for this resource.
    pub fn path_segment(self) -> &'static str {
        self.into()
    }
}
