//! Version and error-correction selection.
//!
//! The version is picked from a fixed table keyed on content length and on
//! whether a logo will occlude the center of the symbol. It is a starting
//! point only: the encoder may return a larger symbol when the content does
//! not fit.

/// Error correction level for a QR code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum QrCodeEcc {
    /// Tolerates ~7% erroneous codewords.
    Low,
    /// Tolerates ~15% erroneous codewords.
    Medium,
    /// Tolerates ~25% erroneous codewords.
    Quartile,
    /// Tolerates ~30% erroneous codewords.
    High,
}

impl QrCodeEcc {
    /// Returns the single-letter name used by the QR standard (L, M, Q, H).
    pub fn letter(self) -> char {
        use QrCodeEcc::*;
        match self {
            Low => 'L',
            Medium => 'M',
            Quartile => 'Q',
            High => 'H',
        }
    }
}

impl From<QrCodeEcc> for qrcode::EcLevel {
    fn from(ecc: QrCodeEcc) -> Self {
        match ecc {
            QrCodeEcc::Low => qrcode::EcLevel::L,
            QrCodeEcc::Medium => qrcode::EcLevel::M,
            QrCodeEcc::Quartile => qrcode::EcLevel::Q,
            QrCodeEcc::High => qrcode::EcLevel::H,
        }
    }
}

/// A QR code version (1–40).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Version(u8);

impl Version {
    /// The minimum version number supported in the QR Code Model 2 standard.
    pub const MIN: Version = Version(1);

    /// The maximum version number supported in the QR Code Model 2 standard.
    pub const MAX: Version = Version(40);

    /// Creates a version object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [1, 40].
    pub const fn new(ver: u8) -> Self {
        assert!(
            Version::MIN.value() <= ver && ver <= Version::MAX.value(),
            "Version number out of range"
        );
        Self(ver)
    }

    /// Returns the value, which is in the range [1, 40].
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Returns the number of modules per side: `version * 4 + 17`.
    pub const fn module_count(self) -> usize {
        (self.0 as usize) * 4 + 17
    }

    /// The version following this one, or `None` at [`Version::MAX`].
    pub fn next(self) -> Option<Version> {
        (self.0 < Version::MAX.0).then(|| Version(self.0 + 1))
    }
}

/// The version and error-correction level requested from the encoder.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct EncodingParameters {
    pub version: Version,
    pub ecc: QrCodeEcc,
}

/// Content length brackets (inclusive upper bounds) and the version for each,
/// without and with a logo. Lengths past the last bound use the last version.
const BRACKETS: [usize; 3] = [25, 50, 100];
const PLAIN_VERSIONS: [u8; 4] = [1, 2, 3, 4];
const LOGO_VERSIONS: [u8; 4] = [4, 6, 8, 10];

/// Picks the encoding parameters for content of `content_len` UTF-16 code units.
///
/// Without a logo the level is [`QrCodeEcc::Medium`]; with a logo it is
/// [`QrCodeEcc::High`] so the occluded center can be recovered.
///
/// # Example
///
/// ```rust
/// use qrsynth::version::{select, QrCodeEcc};
///
/// let params = select(60, true);
/// assert_eq!(params.version.value(), 8);
/// assert_eq!(params.ecc, QrCodeEcc::High);
/// ```
pub fn select(content_len: usize, has_logo: bool) -> EncodingParameters {
    let bracket = BRACKETS
        .iter()
        .position(|&bound| content_len <= bound)
        .unwrap_or(BRACKETS.len());
    let (versions, ecc) = if has_logo {
        (&LOGO_VERSIONS, QrCodeEcc::High)
    } else {
        (&PLAIN_VERSIONS, QrCodeEcc::Medium)
    };
    EncodingParameters {
        version: Version::new(versions[bracket]),
        ecc,
    }
}

/// Length of `content` in UTF-16 code units, the unit the version table is keyed on.
pub fn content_length(content: &str) -> usize {
    content.encode_utf16().count()
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_brackets() {
        let cases = [(1, 1), (25, 1), (26, 2), (50, 2), (51, 3), (100, 3), (101, 4), (5000, 4)];
        for (len, ver) in cases {
            let params = select(len, false);
            assert_eq!(params.version.value(), ver, "length {}", len);
            assert_eq!(params.ecc, QrCodeEcc::Medium);
        }
    }

    #[test]
    fn test_logo_brackets() {
        let cases = [(1, 4), (25, 4), (26, 6), (50, 6), (51, 8), (100, 8), (101, 10), (5000, 10)];
        for (len, ver) in cases {
            let params = select(len, true);
            assert_eq!(params.version.value(), ver, "length {}", len);
            assert_eq!(params.ecc, QrCodeEcc::High);
        }
    }

    #[test]
    fn test_monotonic_in_length() {
        for has_logo in [false, true] {
            let mut last = Version::MIN;
            for len in 0..300 {
                let ver = select(len, has_logo).version;
                assert!(ver >= last);
                last = ver;
            }
        }
    }

    #[test]
    fn test_content_length_counts_utf16_units() {
        assert_eq!(content_length("abc"), 3);
        // U+1F600 is a surrogate pair in UTF-16
        assert_eq!(content_length("\u{1F600}"), 2);
        assert_eq!(content_length("é"), 1);
    }

    #[test]
    fn test_module_count() {
        assert_eq!(Version::MIN.module_count(), 21);
        assert_eq!(Version::new(8).module_count(), 49);
        assert_eq!(Version::MAX.module_count(), 177);
        assert_eq!(Version::MAX.next(), None);
    }
}
