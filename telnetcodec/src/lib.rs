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

//! # Consolenet Telnet Codec
//!
//! Server-side Telnet protocol engine for a single interactive device console.
//!
//! ## Overview
//!
//! The Telnet protocol (RFC 854) interleaves console data with IAC-prefixed commands. This
//! crate separates the two on the inbound side and produces the protocol traffic the server
//! sends back:
//!
//! - **Byte parsing**: [`TelnetParser`] consumes one byte at a time and returns data bytes
//! - **Option negotiation**: every WILL, WONT, DO or DONT is answered through [`policy`]
//! - **Option state**: [`OptionStore`] keeps the last reply sent per option, two bits each
//! - **Subnegotiation**: payloads are captured in a fixed buffer; NAWS updates the
//!   [`WindowSize`]
//! - **Encoding**: [`TelnetEncoder`] writes [`TelnetFrame`]s and escapes outbound data
//!
//! ## Baseline
//!
//! After accepting a client the server sends every frame of [`TelnetParser::baseline`] on
//! its own, recording each with [`TelnetParser::record`] once written. The baseline offers
//! to echo, offers to suppress go-ahead and requests the client's window size.
//!

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

mod codec;
pub mod consts;
mod frame;
pub mod naws;
mod options;
mod parser;
pub mod policy;
mod result;

pub use self::codec::TelnetEncoder;
pub use self::frame::TelnetFrame;
pub use self::naws::WindowSize;
pub use self::options::{MAX_TRACKED_OPTION, OptionStore, TelnetOption, Verb, slot};
pub use self::parser::{
    ParserState, SUBNEGOTIATION_CAPACITY, SubnegotiationBuffer, TelnetParser,
};
pub use self::policy::{Negotiation, decide};
pub use self::result::{CodecError, CodecResult, SubnegotiationErrorKind};
