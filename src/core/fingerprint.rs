//! Content fingerprinting.

/// Compute the fingerprint of a piece of text content.
///
/// The content is folded over its UTF-16 code units with a 31-multiplier
/// rolling checksum kept in a wrapping signed 32-bit accumulator. The result is
/// the decimal text of the final value and may be negative.
///
/// This is a change detector, not a digest: distinct inputs can collide.
///
/// # Examples
///
/// ```rust
/// use deploy_watch::core::fingerprint;
///
/// assert_eq!(fingerprint(""), "0");
/// assert_eq!(fingerprint("abc"), "96354");
/// ```
pub fn fingerprint(content: &str) -> String {
    content
        .encode_utf16()
        .fold(0i32, |acc, unit| {
            // (acc << 5) - acc == acc * 31
            acc.wrapping_mul(31).wrapping_add(i32::from(unit))
        })
        .to_string()
}
