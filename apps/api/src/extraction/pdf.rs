//! Lossy PDF text recovery.
//!
//! Does not walk the PDF object model. Every byte in the printable ASCII range
//! is kept as its character, everything else becomes a space, and whitespace
//! runs are collapsed. Uncompressed text operators survive; compressed
//! streams degrade to noise that the downstream parser tolerates.

const PRINTABLE: std::ops::RangeInclusive<u8> = 32..=126;

pub(super) fn recover_text(bytes: &[u8]) -> String {
    let scanned: String = bytes
        .iter()
        .map(|&b| if PRINTABLE.contains(&b) { b as char } else { ' ' })
        .collect();

    // Output is printable ASCII by construction, so collapsing whitespace is
    // the only cleanup left.
    scanned.split_whitespace().collect::<Vec<_>>().join(" ")
}
