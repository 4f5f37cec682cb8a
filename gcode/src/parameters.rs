use alloc::collections::BTreeMap;
use core::fmt;

/// The `#<id> = <value>` parameter table (spec §3).
///
/// Writable ids are `1..=33 ∪ 100..=199 ∪ 500..=999`; every other id can be
/// read (once set) but never written.
#[derive(Clone, Debug, Default)]
pub struct ParameterTable {
    values: BTreeMap<u32, f64>,
}

/// Failure modes for [`ParameterTable`] reads and writes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParameterError {
    /// Attempted to write to a parameter id outside the writable ranges.
    ReadOnly(u32),
    /// Attempted to read a parameter id that has never been written.
    Unset(u32),
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly(id) => {
                write!(f, "parameter #{id} is not writeable")
            }
            Self::Unset(id) => {
                write!(f, "parameter #{id} has not been set")
            }
        }
    }
}

impl ParameterTable {
    /// Whether `id` falls in one of the writable ranges `1..=33`,
    /// `100..=199`, or `500..=999`.
    #[must_use]
    pub const fn is_writable(id: u32) -> bool {
        matches!(id, 1..=33 | 100..=199 | 500..=999)
    }

    /// Writes `value` to parameter `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::ReadOnly`] if `id` is outside the writable
    /// ranges.
    pub fn write(&mut self, id: u32, value: f64) -> Result<(), ParameterError> {
        if Self::is_writable(id) {
            self.values.insert(id, value);
            Ok(())
        } else {
            Err(ParameterError::ReadOnly(id))
        }
    }

    /// Reads the current value of parameter `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::Unset`] if `id` has never been written.
    pub fn read(&self, id: u32) -> Result<f64, ParameterError> {
        self.values.get(&id).copied().ok_or(ParameterError::Unset(id))
    }
}
