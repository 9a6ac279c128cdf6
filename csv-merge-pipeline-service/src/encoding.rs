use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use std::borrow::Cow;

/// Number of leading bytes inspected when guessing a file's encoding.
pub const SAMPLE_SIZE: usize = 10_000;

///
/// Guesses the text encoding of `sample`.
///
/// ## Arguments
///
/// * `sample` - Leading bytes of a file, at most `SAMPLE_SIZE` are used.
/// * `complete` - Whether the sample is the whole file. When it is not, a
/// multi-byte sequence cut off at the end of the sample is not held against UTF-8.
///
/// Returns `None` for an empty sample.
///
pub fn detect_encoding(sample: &[u8], complete: bool) -> Option<&'static Encoding> {
    if sample.is_empty() {
        return None;
    }
    let sample = &sample[..sample.len().min(SAMPLE_SIZE)];
    if let Some((encoding, _)) = Encoding::for_bom(sample) {
        return Some(encoding);
    }
    let mut detector = EncodingDetector::new();
    detector.feed(sample, complete);
    Some(detector.guess(None, true))
}

/// Guesses the encoding of a file from its contents, looking at the first
/// `SAMPLE_SIZE` bytes. Anything longer counts as a truncated sample.
pub fn detect_file_encoding(contents: &[u8]) -> Option<&'static Encoding> {
    detect_encoding(contents, contents.len() <= SAMPLE_SIZE)
}

/// Decodes `bytes`, replacing malformed sequences with U+FFFD. A BOM, when
/// present, overrides `encoding`.
pub fn decode_lossy<'a>(
    bytes: &'a [u8],
    encoding: Option<&'static Encoding>,
) -> (Cow<'a, str>, &'static Encoding, bool) {
    encoding.unwrap_or(UTF_8).decode(bytes)
}
