use std::io::BufRead;
use std::path::Path;

use murmur_common_audio::audio_util::{q15_from_bits, q15_to_float};

use super::{FormatError, io_error, open};
use crate::Error;

fn read_words<R: BufRead>(
    reader: R,
    parse: impl Fn(&str) -> Option<u32>,
) -> Result<Vec<f32>, Error> {
    let mut samples = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(io_error)?;
        let word = line.trim();
        let raw = parse(word).ok_or_else(|| FormatError::InvalidSample {
            line: index + 1,
            value: word.to_owned(),
        })?;
        samples.push(q15_to_float(q15_from_bits(raw)));
    }
    Ok(samples)
}

fn parse_binary(word: &str) -> Option<u32> {
    if word.is_empty() {
        return Some(0);
    }
    if word.len() > 16 || !word.bytes().all(|b| b == b'0' || b == b'1') {
        return None;
    }
    u32::from_str_radix(word, 2).ok()
}

fn parse_hex(word: &str) -> Option<u32> {
    let digits = word
        .strip_prefix("0x")
        .or_else(|| word.strip_prefix("0X"))
        .unwrap_or(word);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

/// Reads one binary Q15 word per line (MSB first, up to 16 digits). An
/// empty line is a zero sample.
pub fn read_binary_samples_from<R: BufRead>(reader: R) -> Result<Vec<f32>, Error> {
    read_words(reader, parse_binary)
}

/// Reads one hex word per line, with or without a `0x` prefix. The low 16
/// bits are taken as a signed Q15 value. Empty lines are rejected.
pub fn read_hex_samples_from<R: BufRead>(reader: R) -> Result<Vec<f32>, Error> {
    read_words(reader, parse_hex)
}

/// Reads a binary Q15 sample file.
pub fn read_binary_samples(path: impl AsRef<Path>) -> Result<Vec<f32>, Error> {
    let path = path.as_ref();
    read_binary_samples_from(open(path)?).map_err(|err| err.at(path))
}

/// Reads a hex Q15 sample or window coefficient file.
pub fn read_hex_samples(path: impl AsRef<Path>) -> Result<Vec<f32>, Error> {
    let path = path.as_ref();
    read_hex_samples_from(open(path)?).map_err(|err| err.at(path))
}
