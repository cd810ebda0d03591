//! Firmware time, clock capabilities and the wakeup alarm.
//!
//! Time values are written on the command line as eleven colon-separated
//! integers, one per [`EfiTime`] field in declaration order:
//!
//! ```text
//! Year:Month:Day:Hour:Minute:Second:Pad1:Nanosecond:TimeZone:Daylight:Pad2
//! 2024:2:29:13:45:0:0:0:2047:0:0
//! ```
//!
//! The fields are passed to firmware untouched; range checks only ensure each
//! value fits its field, the firmware decides whether the date is valid.

use core::fmt;
use core::str::FromStr;

use crate::error::FormatError;

/// Number of fields in a time specification.
pub const TIME_FIELDS: usize = 11;

/// `time_zone` value meaning "local time, zone unspecified".
pub const UNSPECIFIED_TIMEZONE: i16 = 0x07ff;

/// UEFI time representation.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EfiTime {
    /// Year (1900–9999).
    pub year: u16,
    /// Month (1–12).
    pub month: u8,
    /// Day (1–31).
    pub day: u8,
    /// Hour (0–23).
    pub hour: u8,
    /// Minute (0–59).
    pub minute: u8,
    /// Second (0–59).
    pub second: u8,
    /// Padding byte.
    pub pad1: u8,
    /// Nanoseconds (0–999,999,999).
    pub nanosecond: u32,
    /// Time zone offset in minutes from UTC (−1440 to 1440), or 0x7FF if unspecified.
    pub time_zone: i16,
    /// Daylight saving time flags.
    pub daylight: u8,
    /// Padding byte.
    pub pad2: u8,
}

/// Capabilities of the real time clock device.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EfiTimeCapabilities {
    /// Resolution of the real time clock in counts per second.
    pub resolution: u32,
    /// Accuracy of the real time clock in parts per million.
    pub accuracy: u32,
    /// Non-zero if a time set operation clears the time below the resolution level.
    pub sets_to_zero: u8,
}

impl EfiTimeCapabilities {
    /// Whether setting the time clears the time below the resolution level.
    #[must_use]
    pub const fn sets_to_zero(&self) -> bool {
        self.sets_to_zero != 0
    }
}

fn field<T: FromStr>(text: &str) -> Result<T, FormatError> {
    text.trim().parse().map_err(|_| FormatError::InvalidTime {
        reason: "field is not a number or out of range",
    })
}

impl FromStr for EfiTime {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: [&str; TIME_FIELDS] = {
            let mut parts = [""; TIME_FIELDS];
            let mut count = 0;
            for part in s.split(':') {
                if count == TIME_FIELDS {
                    count += 1;
                    break;
                }
                parts[count] = part;
                count += 1;
            }
            if count != TIME_FIELDS {
                return Err(FormatError::InvalidTime {
                    reason: "expected 11 fields",
                });
            }
            parts
        };

        Ok(Self {
            year: field(parts[0])?,
            month: field(parts[1])?,
            day: field(parts[2])?,
            hour: field(parts[3])?,
            minute: field(parts[4])?,
            second: field(parts[5])?,
            pad1: field(parts[6])?,
            nanosecond: field(parts[7])?,
            time_zone: field(parts[8])?,
            daylight: field(parts[9])?,
            pad2: field(parts[10])?,
        })
    }
}

impl fmt::Display for EfiTime {
    /// Renders the same eleven-field form [`EfiTime::from_str`] accepts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}:{}:{}:{}:{}:{}:{}",
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.pad1,
            self.nanosecond,
            self.time_zone,
            self.daylight,
            self.pad2,
        )
    }
}

/// Wakeup alarm state as read back from firmware.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WakeupTime {
    /// The alarm is armed.
    pub enabled: bool,
    /// The alarm has fired and is waiting to be serviced.
    pub pending: bool,
    /// The programmed alarm time.
    pub time: EfiTime,
}

/// A wakeup alarm setting to program.
///
/// Enabling always carries a time; disabling never does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeupAlarm {
    /// Disarm the alarm.
    Disabled,
    /// Arm the alarm for the given time.
    Enabled(EfiTime),
}

fn parse_bool_word(word: &str) -> Option<bool> {
    let word = word.trim();
    if word.eq_ignore_ascii_case("true") || word == "1" {
        Some(true)
    } else if word.eq_ignore_ascii_case("false") || word == "0" {
        Some(false)
    } else {
        None
    }
}

impl FromStr for WakeupAlarm {
    type Err = FormatError;

    /// Parses `<BoolWord>` or `<BoolWord>,<time-spec>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (word, time) = match s.split_once(',') {
            Some((word, time)) => (word, Some(time)),
            None => (s, None),
        };
        let enabled = parse_bool_word(word).ok_or(FormatError::InvalidWakeup {
            reason: "expected true or false",
        })?;

        match (enabled, time) {
            (true, Some(time)) => Ok(Self::Enabled(time.parse()?)),
            (true, None) => Err(FormatError::InvalidWakeup {
                reason: "enabling requires a time",
            }),
            (false, None) => Ok(Self::Disabled),
            (false, Some(_)) => Err(FormatError::InvalidWakeup {
                reason: "disabling takes no time",
            }),
        }
    }
}

// ── Compile-time layout assertions ──────────────────────────────────

const _: () = {
    assert!(core::mem::size_of::<EfiTime>() == 16);
    assert!(core::mem::size_of::<EfiTimeCapabilities>() == 12);
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_all_fields_in_order() {
        let time: EfiTime = "2024:2:29:13:45:7:1:500:-60:3:2".parse().unwrap();
        assert_eq!(
            time,
            EfiTime {
                year: 2024,
                month: 2,
                day: 29,
                hour: 13,
                minute: 45,
                second: 7,
                pad1: 1,
                nanosecond: 500,
                time_zone: -60,
                daylight: 3,
                pad2: 2,
            }
        );
        assert_eq!(time.to_string(), "2024:2:29:13:45:7:1:500:-60:3:2");
    }

    #[test]
    fn field_count_must_be_exact() {
        assert!("2024:1:1:0:0:0:0:0:0:0".parse::<EfiTime>().is_err());
        assert!("2024:1:1:0:0:0:0:0:0:0:0:0".parse::<EfiTime>().is_err());
        assert!("".parse::<EfiTime>().is_err());
    }

    #[test]
    fn fields_are_range_checked() {
        assert!("70000:1:1:0:0:0:0:0:0:0:0".parse::<EfiTime>().is_err());
        assert!("2024:256:1:0:0:0:0:0:0:0:0".parse::<EfiTime>().is_err());
        assert!("2024:1:1:0:0:0:0:0:40000:0:0".parse::<EfiTime>().is_err());
        assert!("2024:1:1:0:0:0:0:x:0:0:0".parse::<EfiTime>().is_err());
        assert!("2024:1:1:0:0:0:0:0:2047:0:0".parse::<EfiTime>().is_ok());
    }

    #[test]
    fn wakeup_enable_requires_time() {
        assert_eq!(
            "true,2024:1:1:6:30:0:0:0:2047:0:0".parse::<WakeupAlarm>().unwrap(),
            WakeupAlarm::Enabled(EfiTime {
                year: 2024,
                month: 1,
                day: 1,
                hour: 6,
                minute: 30,
                time_zone: UNSPECIFIED_TIMEZONE,
                ..EfiTime::default()
            })
        );
        assert!("TRUE".parse::<WakeupAlarm>().is_err());
        assert!("1,2024:1:1".parse::<WakeupAlarm>().is_err());
    }

    #[test]
    fn wakeup_disable_takes_no_time() {
        assert_eq!("false".parse::<WakeupAlarm>().unwrap(), WakeupAlarm::Disabled);
        assert_eq!("0".parse::<WakeupAlarm>().unwrap(), WakeupAlarm::Disabled);
        assert!("false,2024:1:1:0:0:0:0:0:0:0:0".parse::<WakeupAlarm>().is_err());
        assert!("maybe".parse::<WakeupAlarm>().is_err());
    }
}
