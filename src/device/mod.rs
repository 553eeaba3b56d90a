//! device classes and the device catalog offered to selected_devices rules

mod detect;

pub use detect::{DeviceDetector, UserAgentDetector};

use serde::Serialize;

/// classification of the requesting device
///
/// tablets usually report as mobile too; phone and desktop are derived
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeviceClass {
    pub is_mobile: bool,
    pub is_tablet: bool,
}

impl DeviceClass {
    pub const DESKTOP: DeviceClass = DeviceClass {
        is_mobile: false,
        is_tablet: false,
    };
    pub const PHONE: DeviceClass = DeviceClass {
        is_mobile: true,
        is_tablet: false,
    };
    pub const TABLET: DeviceClass = DeviceClass {
        is_mobile: true,
        is_tablet: true,
    };

    pub fn new(is_mobile: bool, is_tablet: bool) -> Self {
        Self {
            is_mobile,
            is_tablet,
        }
    }

    pub fn is_phone(&self) -> bool {
        self.is_mobile && !self.is_tablet
    }

    pub fn is_desktop(&self) -> bool {
        !self.is_mobile && !self.is_tablet
    }
}

/// selectable device groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Desktops,
    Mobiles,
    Phones,
    Tablets,
}

/// catalog order, as listed in the element editor
pub const CATALOG: [DeviceKind; 4] = [
    DeviceKind::Desktops,
    DeviceKind::Mobiles,
    DeviceKind::Phones,
    DeviceKind::Tablets,
];

/// order in which a selected_devices list is checked; first match wins
pub const PRECEDENCE: [DeviceKind; 4] = [
    DeviceKind::Mobiles,
    DeviceKind::Tablets,
    DeviceKind::Phones,
    DeviceKind::Desktops,
];

impl DeviceKind {
    pub fn id(&self) -> &'static str {
        match self {
            DeviceKind::Desktops => "desktops",
            DeviceKind::Mobiles => "mobiles",
            DeviceKind::Phones => "phones",
            DeviceKind::Tablets => "tablets",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            DeviceKind::Desktops => "Desktops",
            DeviceKind::Mobiles => "Mobiles",
            DeviceKind::Phones => "Phones",
            DeviceKind::Tablets => "Tablets",
        }
    }

    /// exact id lookup
    pub fn parse(id: &str) -> Option<Self> {
        CATALOG.iter().copied().find(|kind| kind.id() == id)
    }

    /// whether a device of the given class belongs to this group
    pub fn includes(&self, device: &DeviceClass) -> bool {
        match self {
            DeviceKind::Mobiles => device.is_mobile,
            DeviceKind::Tablets => device.is_tablet,
            DeviceKind::Phones => device.is_phone(),
            DeviceKind::Desktops => device.is_desktop(),
        }
    }
}

/// catalog entries whose title contains `term` (case-insensitive)
pub fn search(term: &str) -> Vec<DeviceKind> {
    let term = term.trim().to_lowercase();
    CATALOG
        .iter()
        .copied()
        .filter(|kind| kind.title().to_lowercase().contains(&term))
        .collect()
}
