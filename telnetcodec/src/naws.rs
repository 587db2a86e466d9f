//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Negotiate About Window Size
//!

use crate::{CodecError, CodecResult, SubnegotiationErrorKind, consts};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use bytes::BufMut;

/// Terminal dimensions reported through the NAWS option.
///
/// # Format
/// The window size travels as four bytes in big-endian format:
/// - 2 bytes for columns (width)
/// - 2 bytes for rows (height)
///
/// A zero field means the client left that dimension unspecified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WindowSize {
    /// The number of columns (characters) in the terminal window
    pub cols: u16,
    /// The number of rows (lines) in the terminal window
    pub rows: u16,
}

impl WindowSize {
    /// Encoded length of a NAWS payload.
    pub const ENCODED_LEN: usize = 4;

    /// Creates a new `WindowSize` with the specified columns and rows.
    pub fn new(cols: u16, rows: u16) -> Self {
        WindowSize { cols, rows }
    }

    /// Encodes this `WindowSize` into a byte buffer using big-endian format.
    ///
    /// # Returns
    /// `Ok(4)` on successful encoding, or a `CodecError` if the encoding fails.
    pub fn encode<T: BufMut>(&self, dst: &mut T) -> CodecResult<usize> {
        Ok(self.write(&mut dst.writer())?)
    }

    /// Writes the columns followed by the rows as big-endian `u16` values.
    pub fn write<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<usize> {
        writer.write_u16::<BigEndian>(self.cols)?;
        writer.write_u16::<BigEndian>(self.rows)?;
        Ok(Self::ENCODED_LEN)
    }

    /// Decodes a complete NAWS payload.
    ///
    /// # Errors
    /// Returns `CodecError::SubnegotiationError` with `LengthMismatch` unless the payload
    /// is exactly four bytes long.
    pub fn decode(payload: &[u8]) -> CodecResult<WindowSize> {
        if payload.len() != Self::ENCODED_LEN {
            return Err(CodecError::SubnegotiationError {
                option: consts::option::NAWS,
                reason: SubnegotiationErrorKind::LengthMismatch {
                    required: Self::ENCODED_LEN,
                    available: payload.len(),
                },
            });
        }
        let mut reader = payload;
        Ok(WindowSize {
            cols: reader.read_u16::<BigEndian>()?,
            rows: reader.read_u16::<BigEndian>()?,
        })
    }

    /// Applies a reported size on top of this one, keeping any dimension reported as zero.
    pub fn update(self, reported: WindowSize) -> WindowSize {
        WindowSize {
            cols: if reported.cols == 0 {
                self.cols
            } else {
                reported.cols
            },
            rows: if reported.rows == 0 {
                self.rows
            } else {
                reported.rows
            },
        }
    }
}

impl Default for WindowSize {
    /// A standard 80x24 terminal, used until the client reports its size.
    fn default() -> Self {
        WindowSize { cols: 80, rows: 24 }
    }
}

impl std::fmt::Display for WindowSize {
    /// Formats the `WindowSize` as `(cols,rows)`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.cols, self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn test_decode_exact_payload() {
        let size = WindowSize::decode(&[0x00, 0x50, 0x00, 0x18]).unwrap();
        assert_eq!(size, WindowSize::new(80, 24));

        let size = WindowSize::decode(&[0x01, 0x00, 0x00, 0x40]).unwrap();
        assert_eq!(size, WindowSize::new(256, 64));
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let err = WindowSize::decode(&[0x00, 0x50, 0x00]).unwrap_err();
        assert_eq!(
            err,
            CodecError::SubnegotiationError {
                option: consts::option::NAWS,
                reason: SubnegotiationErrorKind::LengthMismatch {
                    required: 4,
                    available: 3
                },
            }
        );
        assert!(WindowSize::decode(&[0, 80, 0, 24, 0]).is_err());
    }

    #[test]
    fn test_encode() {
        let mut buffer = BytesMut::new();
        assert_eq!(WindowSize::new(132, 43).encode(&mut buffer).unwrap(), 4);
        assert_eq!(&buffer[..], &[0x00, 0x84, 0x00, 0x2B]);
    }

    #[test]
    fn test_update_keeps_unspecified_dimensions() {
        let current = WindowSize::new(80, 24);
        assert_eq!(current.update(WindowSize::new(0, 50)), WindowSize::new(80, 50));
        assert_eq!(current.update(WindowSize::new(120, 0)), WindowSize::new(120, 24));
        assert_eq!(current.update(WindowSize::new(0, 0)), current);
    }

    #[test]
    fn test_display() {
        assert_eq!(WindowSize::default().to_string(), "(80,24)");
    }
}
