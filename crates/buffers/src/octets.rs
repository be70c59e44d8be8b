//! Debug utility for printing octets as hex strings.

use std::fmt;

/// Formats the head of a byte slice as space-separated hex.
///
/// Formatting is deferred until the value is displayed, so it can be handed
/// to a disabled log statement at no cost.
///
/// # Example
///
/// ```
/// use dechunk_buffers::OctetsPreview;
///
/// assert_eq!(OctetsPreview::new(&[0x01, 0x02, 0x0a, 0xff], 16).to_string(), "01 02 0a ff");
/// assert_eq!(OctetsPreview::new(&[], 16).to_string(), "");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct OctetsPreview<'a> {
    octets: &'a [u8],
    max: usize,
}

impl<'a> OctetsPreview<'a> {
    /// Default number of bytes shown before truncating.
    pub const DEFAULT_MAX: usize = 16;

    pub fn new(octets: &'a [u8], max: usize) -> Self {
        Self { octets, max }
    }
}

impl fmt::Display for OctetsPreview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.octets.iter().take(self.max).enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{byte:02x}")?;
        }
        if self.octets.len() > self.max {
            write!(f, "... ({} more)", self.octets.len() - self.max)?;
        }
        Ok(())
    }
}
