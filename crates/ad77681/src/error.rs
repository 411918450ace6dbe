use core::fmt;

use heapless::Vec;

/// Longest sequence of masked writes issued by a single setter.
pub const MAX_SETTER_STEPS: usize = 3;

/// Masked writes issued by [`Ad77681::setup`](crate::Ad77681::setup).
pub const MAX_SETUP_STEPS: usize = 11;

/// Checksum byte sent by the device did not match the one computed locally.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChecksumMismatch {
    pub expected: u8,
    pub received: u8,
}

impl fmt::Display for ChecksumMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "checksum mismatch: expected {:#04x}, received {:#04x}",
            self.expected, self.received
        )
    }
}

impl core::error::Error for ChecksumMismatch {}

/// Failure of a single transaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// The SPI exchange itself failed.
    Spi(E),
    /// The exchange completed but its checksum did not verify.
    Checksum(ChecksumMismatch),
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Spi(e) => write!(f, "spi transfer failed: {e:?}"),
            Error::Checksum(mismatch) => fmt::Display::fmt(mismatch, f),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for Error<E> {}

impl<E> From<ChecksumMismatch> for Error<E> {
    fn from(mismatch: ChecksumMismatch) -> Self {
        Error::Checksum(mismatch)
    }
}

/// Outcome of verifying a response.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Integrity {
    /// No checksum covers this response.
    Unchecked,
    Verified,
    Mismatch(ChecksumMismatch),
}

impl Integrity {
    pub(crate) fn compare(expected: u8, received: u8) -> Self {
        if expected == received {
            Integrity::Verified
        } else {
            Integrity::Mismatch(ChecksumMismatch { expected, received })
        }
    }
}

/// Data returned by the device together with its verification outcome.
///
/// A mismatch does not discard the value; the caller decides whether to trust it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Checked<T> {
    pub value: T,
    pub integrity: Integrity,
}

impl<T> Checked<T> {
    /// False only when a checksum was present and did not verify.
    pub fn is_trusted(&self) -> bool {
        !matches!(self.integrity, Integrity::Mismatch(_))
    }

    /// Converts the value, keeping its integrity.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Checked<U> {
        Checked {
            value: f(self.value),
            integrity: self.integrity,
        }
    }

    /// Drops the value if its checksum did not verify.
    pub fn into_result(self) -> Result<T, ChecksumMismatch> {
        match self.integrity {
            Integrity::Mismatch(mismatch) => Err(mismatch),
            _ => Ok(self.value),
        }
    }
}

/// Register field touched by a configuration step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Field {
    /// First write of the soft reset sequence.
    ResetArm,
    /// Second write of the soft reset sequence.
    ResetFire,
    PowerMode,
    MclkDiv,
    ConvMode,
    DiagMux,
    DiagSelect,
    ConvLen,
    StatusByte,
    ChecksumEnable,
    ChecksumType,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StepFailure<E> {
    pub field: Field,
    pub error: Error<E>,
}

/// Every step that failed during a multi-write operation.
///
/// Steps are not rolled back: writes that succeeded stay applied on the
/// device, so hardware and cached configuration may disagree until the
/// failed fields are written again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepFailures<E, const N: usize> {
    failures: Vec<StepFailure<E>, N>,
}

impl<E, const N: usize> StepFailures<E, N> {
    pub(crate) const fn new() -> Self {
        Self {
            failures: Vec::new(),
        }
    }

    /// Records a failed step, returns whether `result` was ok.
    pub(crate) fn record(&mut self, field: Field, result: Result<(), Error<E>>) -> bool {
        match result {
            Ok(()) => true,
            Err(error) => {
                // Capacity equals the number of steps, so this never overflows.
                let _ = self.failures.push(StepFailure { field, error });
                false
            }
        }
    }

    pub(crate) fn merge<const M: usize>(&mut self, other: StepFailures<E, M>) {
        for failure in other.failures {
            let _ = self.failures.push(failure);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failed steps in the order they ran.
    pub fn failures(&self) -> &[StepFailure<E>] {
        &self.failures
    }

    /// Whether any step touching `field` failed.
    pub fn failed(&self, field: Field) -> bool {
        self.failures.iter().any(|f| f.field == field)
    }

    pub(crate) fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl<E: fmt::Debug, const N: usize> fmt::Display for StepFailures<E, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} configuration step(s) failed", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "; {:?}: {}", failure.field, failure.error)?;
        }
        Ok(())
    }
}

impl<E: fmt::Debug, const N: usize> core::error::Error for StepFailures<E, N> {}

/// Failure of a configuration setter.
pub type ConfigError<E> = StepFailures<E, MAX_SETTER_STEPS>;

/// Failed steps of [`Ad77681::setup`](crate::Ad77681::setup), empty on success.
pub type SetupReport<E> = StepFailures<E, MAX_SETUP_STEPS>;
