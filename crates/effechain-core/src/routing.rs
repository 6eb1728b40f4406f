//! Per-instance signal routing: send/return buses and single-channel targeting.
//!
//! ```text
//!  bus 0 (main) ──► unit ──► bus 0          inputBus == outputBus: overwrite
//!  bus 0 (main) ──► unit ──+ bus 2          inputBus != outputBus: summed in
//!  bus 2        ──► unit ──+ bus 0          (return)
//! ```
//!
//! Bus 0 is the block delivered by the host and the only one that reaches the
//! output. Buses `1..=MAX_BUSES` start every block silent.

use crate::parameter::ParamValue;
use serde_json::{Map, Value};

/// Number of auxiliary buses next to the main bus.
pub const MAX_BUSES: u8 = 4;

/// Channel a unit is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelTarget {
    Left,
    Right,
}

impl ChannelTarget {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            ChannelTarget::Left => 0,
            ChannelTarget::Right => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChannelTarget::Left => "L",
            ChannelTarget::Right => "R",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "L" | "l" | "left" => Some(ChannelTarget::Left),
            "R" | "r" | "right" => Some(ChannelTarget::Right),
            _ => None,
        }
    }
}

/// Where an instance reads from and writes to.
///
/// The default (main bus in and out, all channels) is plain in-place
/// processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Routing {
    pub input_bus: u8,
    pub output_bus: u8,
    pub channel: Option<ChannelTarget>,
}

impl Routing {
    pub const KEY_INPUT_BUS: &'static str = "inputBus";
    pub const KEY_OUTPUT_BUS: &'static str = "outputBus";
    pub const KEY_CHANNEL: &'static str = "channel";

    pub fn is_default(&self) -> bool {
        *self == Routing::default()
    }

    /// Bus indices clamped to `0..=MAX_BUSES`.
    pub fn clamped(self) -> Self {
        Self {
            input_bus: self.input_bus.min(MAX_BUSES),
            output_bus: self.output_bus.min(MAX_BUSES),
            channel: self.channel,
        }
    }

    /// Apply one wire-format entry if `key` is a routing key.
    ///
    /// `None` means the key is not routing. `Some(false)` means it is, but the
    /// value could not be interpreted and nothing changed.
    pub(crate) fn apply_wire(&mut self, key: &str, value: &Value) -> Option<bool> {
        match key {
            Self::KEY_INPUT_BUS | "ib" => Some(set_bus(&mut self.input_bus, value)),
            Self::KEY_OUTPUT_BUS | "ob" => Some(set_bus(&mut self.output_bus, value)),
            Self::KEY_CHANNEL => Some(match value {
                Value::Null => {
                    self.channel = None;
                    true
                }
                Value::String(s) if s.is_empty() || s == "all" => {
                    self.channel = None;
                    true
                }
                Value::String(s) => match ChannelTarget::parse(s) {
                    Some(target) => {
                        self.channel = Some(target);
                        true
                    }
                    None => false,
                },
                _ => false,
            }),
            _ => None,
        }
    }

    /// Write the non-default attributes into a wire map.
    pub(crate) fn write_wire(&self, map: &mut Map<String, Value>) {
        if self.input_bus != 0 {
            map.insert(Self::KEY_INPUT_BUS.to_string(), Value::from(self.input_bus));
        }
        if self.output_bus != 0 {
            map.insert(Self::KEY_OUTPUT_BUS.to_string(), Value::from(self.output_bus));
        }
        if let Some(target) = self.channel {
            map.insert(Self::KEY_CHANNEL.to_string(), Value::from(target.as_str()));
        }
    }
}

fn set_bus(slot: &mut u8, value: &Value) -> bool {
    let bus = ParamValue::from_json(value).and_then(|v| v.as_f64());
    match bus {
        Some(bus) if bus.is_finite() => {
            *slot = bus.round().clamp(0.0, MAX_BUSES as f64) as u8;
            true
        }
        _ => false,
    }
}
