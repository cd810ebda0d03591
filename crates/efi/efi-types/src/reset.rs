//! System reset types.

use core::str::FromStr;

use crate::error::FormatError;

/// Type of reset requested through `ResetSystem`.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetType {
    /// Causes a system-wide reset, equivalent to power cycling.
    Cold = 0,
    /// Causes a system-wide initialization, equivalent to a warm reset.
    Warm = 1,
    /// Causes the system to enter a platform-specific shutdown state.
    Shutdown = 2,
    /// Causes a platform-specific reset type.
    PlatformSpecific = 3,
}

impl ResetType {
    /// Returns the reset type for its numeric value.
    #[must_use]
    pub const fn from_raw(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Cold),
            1 => Some(Self::Warm),
            2 => Some(Self::Shutdown),
            3 => Some(Self::PlatformSpecific),
            _ => None,
        }
    }
}

impl FromStr for ResetType {
    type Err = FormatError;

    /// Accepts `cold`, `warm`, `shutdown`, `platform` (any case) or `0`-`3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let named = [
            ("cold", Self::Cold),
            ("warm", Self::Warm),
            ("shutdown", Self::Shutdown),
            ("platform", Self::PlatformSpecific),
        ];
        if let Some(&(_, kind)) = named.iter().find(|(name, _)| s.eq_ignore_ascii_case(name)) {
            return Ok(kind);
        }
        s.parse::<u32>()
            .ok()
            .and_then(Self::from_raw)
            .ok_or(FormatError::InvalidResetType)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names_and_numbers() {
        assert_eq!("cold".parse(), Ok(ResetType::Cold));
        assert_eq!("Warm".parse(), Ok(ResetType::Warm));
        assert_eq!("2".parse(), Ok(ResetType::Shutdown));
        assert_eq!("platform".parse(), Ok(ResetType::PlatformSpecific));
        assert_eq!("4".parse::<ResetType>(), Err(FormatError::InvalidResetType));
        assert_eq!("hard".parse::<ResetType>(), Err(FormatError::InvalidResetType));
    }
}
