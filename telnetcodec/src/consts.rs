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


//! Telnet command, option and control character bytes.

/// Interpret As Command
pub const IAC: u8 = 255;
/// Peer is asked to stop performing, or confirms it no longer performs, an option
pub const DONT: u8 = 254;
/// Peer is asked to start performing, or confirms it performs, an option
pub const DO: u8 = 253;
/// Sender refuses to perform, or stops performing, an option
pub const WONT: u8 = 252;
/// Sender wants to begin, or confirms it performs, an option
pub const WILL: u8 = 251;
/// Subnegotiation Begin
pub const SB: u8 = 250;
/// Go Ahead
pub const GA: u8 = 249;
/// Erase Line
pub const EL: u8 = 248;
/// Erase Character
pub const EC: u8 = 247;
/// Are You There
pub const AYT: u8 = 246;
/// Abort Output
pub const AO: u8 = 245;
/// Interrupt Process
pub const IP: u8 = 244;
/// Break
pub const BRK: u8 = 243;
/// Data Mark
pub const DM: u8 = 242;
/// No Operation
pub const NOP: u8 = 241;
/// Subnegotiation End
pub const SE: u8 = 240;

/// Option codes understood by the console engine.
///
/// See [IANA Telnet Options](https://www.iana.org/assignments/telnet-options/telnet-options.xhtml)
pub mod option {
    /// Echo [RFC857](https://tools.ietf.org/html/rfc857)
    pub const ECHO: u8 = 1;
    /// Suppress Go Ahead [RFC858](https://tools.ietf.org/html/rfc858)
    pub const SGA: u8 = 3;
    /// Terminal Type [RFC1091](http://www.iana.org/go/rfc1091)
    pub const TTYPE: u8 = 24;
    /// Negotiate About Window Size [RFC1073](http://www.iana.org/go/rfc1073)
    pub const NAWS: u8 = 31;
    /// Terminal Speed [RFC1079](http://www.iana.org/go/rfc1079)
    pub const TSPEED: u8 = 32;
    /// Linemode [RFC1184](http://www.iana.org/go/rfc1184)
    pub const LINEMODE: u8 = 34;
    /// Environment Option [RFC1408](http://www.iana.org/go/rfc1408)
    pub const OLD_ENVIRONMENT: u8 = 36;
    /// New Environment Option [RFC1572](http://www.iana.org/go/rfc1572)
    pub const NEW_ENVIRONMENT: u8 = 39;
    /// Telnet Start TLS
    pub const START_TLS: u8 = 46;
    /// Terminates the option name table
    pub const UNDEFINED: u8 = 255;
}

/// Null
pub const NUL: u8 = 0x00;
/// Bell
pub const BEL: u8 = 0x07;
/// Backspace
pub const BS: u8 = 0x08;
/// Line Feed
pub const LF: u8 = 0x0A;
/// Carriage Return
pub const CR: u8 = 0x0D;
/// Group Separator, requests a disconnect from the console
pub const GS: u8 = 0x1D;
/// Space
pub const SP: u8 = 0x20;
/// Tilde, the last printable ASCII character
pub const TILDE: u8 = 0x7E;
/// Delete
pub const DEL: u8 = 0x7F;
