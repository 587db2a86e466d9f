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


/// Result Type for Codec Operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Represents possible errors raised by the option store and payload decoders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// An I/O error occurred while writing an encoded frame.
    IOError {
        /// The kind of I/O error that occurred
        kind: std::io::ErrorKind,
        /// Description of the operation that failed
        operation: String,
    },

    /// The option code lies outside the range tracked by the option store.
    OptionOutOfRange {
        /// The rejected option code
        code: u8,
        /// Highest option code the store tracks
        max: u8,
    },

    /// A subnegotiation payload could not be decoded.
    SubnegotiationError {
        /// The telnet option being subnegotiated
        option: u8,
        /// Specific reason for the failure
        reason: SubnegotiationErrorKind,
    },

    /// A byte that is not a negotiation verb was used as one.
    InvalidVerb(u8),
}

/// Specific kinds of subnegotiation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubnegotiationErrorKind {
    /// The payload length does not match what the option requires.
    LengthMismatch {
        /// Number of bytes required
        required: usize,
        /// Number of bytes available
        available: usize,
    },

    /// The payload exceeded the capture buffer and was truncated.
    Truncated {
        /// Number of bytes that were dropped
        dropped: usize,
    },
}

impl std::error::Error for CodecError {}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodecError::IOError { kind, operation } => {
                write!(f, "I/O error during {}: {:?}", operation, kind)
            }
            CodecError::OptionOutOfRange { code, max } => {
                write!(f, "Option {} is outside the tracked range 0..={}", code, max)
            }
            CodecError::SubnegotiationError { option, reason } => {
                write!(f, "Subnegotiation error for option {}: {}", option, reason)
            }
            CodecError::InvalidVerb(byte) => {
                write!(f, "Invalid negotiation verb: 0x{:02X}", byte)
            }
        }
    }
}

impl std::fmt::Display for SubnegotiationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubnegotiationErrorKind::LengthMismatch {
                required,
                available,
            } => {
                write!(
                    f,
                    "length mismatch (required: {}, available: {})",
                    required, available
                )
            }
            SubnegotiationErrorKind::Truncated { dropped } => {
                write!(f, "payload truncated, {} bytes dropped", dropped)
            }
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::IOError {
            kind: err.kind(),
            operation: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_display() {
        let err = CodecError::OptionOutOfRange { code: 200, max: 46 };
        assert_eq!(
            err.to_string(),
            "Option 200 is outside the tracked range 0..=46"
        );
    }

    #[test]
    fn test_subnegotiation_display() {
        let err = CodecError::SubnegotiationError {
            option: 31,
            reason: SubnegotiationErrorKind::LengthMismatch {
                required: 4,
                available: 3,
            },
        };
        assert_eq!(
            err.to_string(),
            "Subnegotiation error for option 31: length mismatch (required: 4, available: 3)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        match CodecError::from(io) {
            CodecError::IOError { kind, .. } => assert_eq!(kind, std::io::ErrorKind::BrokenPipe),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
