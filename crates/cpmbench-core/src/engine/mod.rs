//! CPU engines that execute one instruction per step through [`Hooks`].

mod alu;
mod i8080;

use std::fmt;
use std::str::FromStr;

use crate::{Hooks, UnknownEngine};

pub use i8080::I8080;

/// Instruction-set interpreter driven through the hook contract.
pub trait Engine {
    /// Short engine name used in logs and on the command line.
    const NAME: &'static str;

    /// Executes exactly one instruction against `cpu`.
    ///
    /// Clock ticks are reported through [`Hooks::tick`] before returning.
    fn step<H: Hooks>(cpu: &mut H);
}

/// Runtime selector for the engine a harness is built around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EngineKind {
    /// Intel 8080.
    #[default]
    I8080,
}

impl EngineKind {
    /// Every selectable engine.
    pub const ALL: [Self; 1] = [Self::I8080];

    /// Canonical engine name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::I8080 => I8080::NAME,
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EngineKind {
    type Err = UnknownEngine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "i8080" | "8080" => Ok(Self::I8080),
            _ => Err(UnknownEngine {
                name: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::EngineKind;

    #[rstest]
    #[case("i8080")]
    #[case("8080")]
    #[case("I8080")]
    fn engine_names_parse(#[case] name: &str) {
        assert_eq!(name.parse::<EngineKind>(), Ok(EngineKind::I8080));
    }

    #[test]
    fn unknown_engine_is_rejected_with_its_name() {
        let err = "z80".parse::<EngineKind>().unwrap_err();
        assert_eq!(err.name, "z80");
        assert_eq!(err.to_string(), "unknown engine 'z80'");
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for kind in EngineKind::ALL {
            assert_eq!(kind.to_string().parse::<EngineKind>(), Ok(kind));
        }
    }
}
