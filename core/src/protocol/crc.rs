//! CRC-16/CCITT-FALSE checksum used by tag 63
//!
//! Polynomial 0x1021, initial register 0xFFFF, no input or output
//! reflection, no final XOR. Payloads are ASCII, so one byte is one
//! character code.

const POLYNOMIAL: u16 = 0x1021;
const INITIAL: u16 = 0xFFFF;

/// Compute the raw CRC-16/CCITT-FALSE register over `data`.
pub fn crc16_ccitt_false(data: &[u8]) -> u16 {
    let mut crc = INITIAL;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            crc = if crc & 0x8000 != 0 {
                (crc << 1) ^ POLYNOMIAL
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Checksum of a payload prefix as 4 uppercase hex digits.
///
/// `prefix` must already end with the literal `6304`.
pub fn checksum(prefix: &str) -> String {
    format!("{:04X}", crc16_ccitt_false(prefix.as_bytes()))
}
