//! Variable attribute flags.

use bitflags::bitflags;

bitflags! {
    /// Attributes stored alongside every firmware variable.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VariableAttributes: u32 {
        /// The variable survives a power cycle.
        const NON_VOLATILE = 0x0000_0001;
        /// The variable is visible to boot services.
        const BOOTSERVICE_ACCESS = 0x0000_0002;
        /// The variable is visible to runtime services.
        const RUNTIME_ACCESS = 0x0000_0004;
        /// The variable holds a hardware error record.
        const HARDWARE_ERROR_RECORD = 0x0000_0008;
        /// Writes require count-based authentication (deprecated by UEFI).
        const AUTHENTICATED_WRITE_ACCESS = 0x0000_0010;
        /// Writes require time-based authentication.
        const TIME_BASED_AUTHENTICATED_WRITE_ACCESS = 0x0000_0020;
        /// Writes append to the existing data instead of replacing it.
        const APPEND_WRITE = 0x0000_0040;
    }
}

impl Default for VariableAttributes {
    /// Non-volatile, visible to both boot and runtime services.
    fn default() -> Self {
        Self::NON_VOLATILE | Self::BOOTSERVICE_ACCESS | Self::RUNTIME_ACCESS
    }
}

/// Variable store capacity as reported by `QueryVariableInfo`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariableStorageInfo {
    /// Total storage available for variables with the queried attributes.
    pub maximum_storage_size: u64,
    /// Storage still free for variables with the queried attributes.
    pub remaining_storage_size: u64,
    /// Largest single variable that can be stored with the queried attributes.
    pub maximum_variable_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_nv_bs_rt() {
        assert_eq!(VariableAttributes::default().bits(), 0x7);
    }

    #[test]
    fn unknown_bits_are_kept() {
        let attrs = VariableAttributes::from_bits_retain(0x8000_0007);
        assert!(attrs.contains(VariableAttributes::default()));
        assert_eq!(attrs.bits(), 0x8000_0007);
    }
}
