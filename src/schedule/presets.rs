//! Built-in schedule presets.

use crate::schedule::types::TimeOfDay;

/// A named pair of bell times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    open: Option<(u32, u32)>,
    close: Option<(u32, u32)>,
}

impl Preset {
    pub fn open(&self) -> Option<TimeOfDay> {
        self.open.and_then(|(h, m)| TimeOfDay::new(h, m))
    }

    pub fn close(&self) -> Option<TimeOfDay> {
        self.close.and_then(|(h, m)| TimeOfDay::new(h, m))
    }
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "market",
        description: "Regular session: open 09:30, close 16:00",
        open: Some((9, 30)),
        close: Some((16, 0)),
    },
    Preset {
        name: "premarket",
        description: "Pre-market session: 04:00 to 09:30",
        open: Some((4, 0)),
        close: Some((9, 30)),
    },
    Preset {
        name: "afterhours",
        description: "After-hours session: 16:00 to 20:00",
        open: Some((16, 0)),
        close: Some((20, 0)),
    },
    Preset {
        name: "opening-bell",
        description: "Opening bell only at 09:30",
        open: Some((9, 30)),
        close: None,
    },
    Preset {
        name: "closing-bell",
        description: "Closing bell only at 16:00",
        open: None,
        close: Some((16, 0)),
    },
];

/// Look up a preset by name, ignoring case.
pub fn find_preset(name: &str) -> Option<&'static Preset> {
    let name = name.trim();
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}
