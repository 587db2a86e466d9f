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

use crate::{CodecError, CodecResult, consts};

///
/// [Telnet Terminal Options](https://www.iana.org/assignments/telnet-options/telnet-options.xhtml)
/// negotiated by the console engine.
///
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum TelnetOption {
    /// [`consts::option::ECHO`] Telnet Echo Option [RFC857](https://tools.ietf.org/html/rfc857)
    Echo,
    /// [`consts::option::SGA`] Suppress Go ahead [RFC858](https://tools.ietf.org/html/rfc858)
    SuppressGoAhead,
    /// [`consts::option::TTYPE`] Terminal Type [RFC1091](http://www.iana.org/go/rfc1091)
    TTYPE,
    /// [`consts::option::NAWS`] Negotiate About Window Size [RFC1073](http://www.iana.org/go/rfc1073)
    NAWS,
    /// [`consts::option::TSPEED`] Terminal Speed [RFC1079](http://www.iana.org/go/rfc1079)
    TSPEED,
    /// [`consts::option::LINEMODE`] Linemode [RFC1184](http://www.iana.org/go/rfc1184)
    Linemode,
    /// [`consts::option::OLD_ENVIRONMENT`] Environment Option [RFC1408](http://www.iana.org/go/rfc1408)
    Environment,
    /// [`consts::option::NEW_ENVIRONMENT`] New Environment Option [RFC1572](http://www.iana.org/go/rfc1572)
    NewEnvironment,
    /// [`consts::option::START_TLS`] Telnet Start TLS
    StartTLS,
    /// Any option code the engine has no name for
    Unknown(u8),
}

/// Short option names as printed by the status report, terminated by the undefined sentinel.
const OPTION_NAMES: [(u8, &str); 10] = [
    (consts::option::ECHO, "Echo"),
    (consts::option::SGA, "SGA"),
    (consts::option::TTYPE, "TType"),
    (consts::option::NAWS, "NaWS"),
    (consts::option::TSPEED, "TSPeed"),
    (consts::option::LINEMODE, "LMode"),
    (consts::option::OLD_ENVIRONMENT, "Oenv"),
    (consts::option::NEW_ENVIRONMENT, "Nenv"),
    (consts::option::START_TLS, "STLS"),
    (consts::option::UNDEFINED, "Oxx"),
];

impl TelnetOption {
    /// Converts a `TelnetOption` into its option code.
    pub fn to_u8(&self) -> u8 {
        match self {
            TelnetOption::Echo => consts::option::ECHO,
            TelnetOption::SuppressGoAhead => consts::option::SGA,
            TelnetOption::TTYPE => consts::option::TTYPE,
            TelnetOption::NAWS => consts::option::NAWS,
            TelnetOption::TSPEED => consts::option::TSPEED,
            TelnetOption::Linemode => consts::option::LINEMODE,
            TelnetOption::Environment => consts::option::OLD_ENVIRONMENT,
            TelnetOption::NewEnvironment => consts::option::NEW_ENVIRONMENT,
            TelnetOption::StartTLS => consts::option::START_TLS,
            TelnetOption::Unknown(byte) => *byte,
        }
    }

    /// Maps an option code to a `TelnetOption`, falling back to [`TelnetOption::Unknown`].
    pub fn from_u8(byte: u8) -> Self {
        match byte {
            consts::option::ECHO => TelnetOption::Echo,
            consts::option::SGA => TelnetOption::SuppressGoAhead,
            consts::option::TTYPE => TelnetOption::TTYPE,
            consts::option::NAWS => TelnetOption::NAWS,
            consts::option::TSPEED => TelnetOption::TSPEED,
            consts::option::LINEMODE => TelnetOption::Linemode,
            consts::option::OLD_ENVIRONMENT => TelnetOption::Environment,
            consts::option::NEW_ENVIRONMENT => TelnetOption::NewEnvironment,
            consts::option::START_TLS => TelnetOption::StartTLS,
            byte => TelnetOption::Unknown(byte),
        }
    }

    /// Short name used in status reports.
    ///
    /// Walks the name table up to the undefined sentinel, so any option without an entry
    /// reports the sentinel's name.
    pub fn name(&self) -> &'static str {
        let code = self.to_u8();
        OPTION_NAMES
            .iter()
            .find(|(entry, _)| *entry == code || *entry == consts::option::UNDEFINED)
            .map_or("Oxx", |(_, name)| *name)
    }
}

impl std::fmt::Display for TelnetOption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetOption::Echo => write!(f, "Echo"),
            TelnetOption::SuppressGoAhead => write!(f, "SuppressGoAhead"),
            TelnetOption::TTYPE => write!(f, "TTYPE"),
            TelnetOption::NAWS => write!(f, "NAWS"),
            TelnetOption::TSPEED => write!(f, "TSPEED"),
            TelnetOption::Linemode => write!(f, "Linemode"),
            TelnetOption::Environment => write!(f, "Environment"),
            TelnetOption::NewEnvironment => write!(f, "NewEnvironment"),
            TelnetOption::StartTLS => write!(f, "StartTLS"),
            TelnetOption::Unknown(byte) => write!(f, "Unknown({})", byte),
        }
    }
}

impl From<u8> for TelnetOption {
    fn from(byte: u8) -> Self {
        TelnetOption::from_u8(byte)
    }
}

impl From<TelnetOption> for u8 {
    fn from(option: TelnetOption) -> Self {
        option.to_u8()
    }
}

/// Negotiation verb, doubling as the negotiated state recorded for an option.
///
/// The discriminant is the two-bit value kept in the [`OptionStore`].
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Verb {
    /// Sender performs, or wants to perform, the option
    #[default]
    Will = 0,
    /// Sender refuses to perform the option
    Wont = 1,
    /// Receiver is asked to perform the option
    Do = 2,
    /// Receiver is asked not to perform the option
    Dont = 3,
}

impl Verb {
    /// All verbs in bit order.
    pub const ALL: [Verb; 4] = [Verb::Will, Verb::Wont, Verb::Do, Verb::Dont];

    /// Maps a command byte (`WILL`..=`DONT`) to a verb.
    pub fn from_command(byte: u8) -> Option<Self> {
        match byte {
            consts::WILL => Some(Verb::Will),
            consts::WONT => Some(Verb::Wont),
            consts::DO => Some(Verb::Do),
            consts::DONT => Some(Verb::Dont),
            _ => None,
        }
    }

    /// Command byte sent on the wire for this verb.
    pub fn command(&self) -> u8 {
        match self {
            Verb::Will => consts::WILL,
            Verb::Wont => consts::WONT,
            Verb::Do => consts::DO,
            Verb::Dont => consts::DONT,
        }
    }

    /// Two-bit state value.
    pub fn bits(&self) -> u8 {
        *self as u8
    }

    /// Decodes a two-bit state value, ignoring any higher bits.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => Verb::Will,
            1 => Verb::Wont,
            2 => Verb::Do,
            _ => Verb::Dont,
        }
    }

    /// True for WILL and WONT, the verbs a peer uses to describe itself.
    pub fn is_offer(&self) -> bool {
        matches!(self, Verb::Will | Verb::Wont)
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verb::Will => write!(f, "WILL"),
            Verb::Wont => write!(f, "WONT"),
            Verb::Do => write!(f, "DO"),
            Verb::Dont => write!(f, "DONT"),
        }
    }
}

impl TryFrom<u8> for Verb {
    type Error = CodecError;

    fn try_from(byte: u8) -> CodecResult<Self> {
        Verb::from_command(byte).ok_or(CodecError::InvalidVerb(byte))
    }
}

/// Highest option code tracked by the [`OptionStore`].
pub const MAX_TRACKED_OPTION: u8 = consts::option::START_TLS;

const STATES_PER_BYTE: usize = 4;
const TABLE_LEN: usize = (MAX_TRACKED_OPTION as usize + 1).div_ceil(STATES_PER_BYTE);

/// Locates the two-bit slot for an option as `(byte index, bit shift)`.
///
/// Returns `None` when the option is outside `0..=MAX_TRACKED_OPTION`.
pub fn slot(option: TelnetOption) -> Option<(usize, u32)> {
    let code = option.to_u8();
    if code > MAX_TRACKED_OPTION {
        return None;
    }
    let code = code as usize;
    Some((code / STATES_PER_BYTE, ((code % STATES_PER_BYTE) * 2) as u32))
}

/// Negotiated state for every tracked option, packed two bits per option.
///
/// An option that was never set reads as [`Verb::Will`], the zero value.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OptionStore {
    table: [u8; TABLE_LEN],
}

impl OptionStore {
    /// Creates a store with every option at the zero state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `state` for `option`.
    pub fn set(&mut self, option: TelnetOption, state: Verb) -> CodecResult<()> {
        let (index, shift) = slot(option).ok_or(CodecError::OptionOutOfRange {
            code: option.to_u8(),
            max: MAX_TRACKED_OPTION,
        })?;
        self.table[index] &= !(0x03 << shift);
        self.table[index] |= state.bits() << shift;
        Ok(())
    }

    /// Returns the last state recorded for `option`.
    pub fn get(&self, option: TelnetOption) -> CodecResult<Verb> {
        let (index, shift) = slot(option).ok_or(CodecError::OptionOutOfRange {
            code: option.to_u8(),
            max: MAX_TRACKED_OPTION,
        })?;
        Ok(Verb::from_bits(self.table[index] >> shift))
    }

    /// Returns every tracked option to the zero state.
    pub fn clear(&mut self) {
        self.table = [0; TABLE_LEN];
    }

    /// Iterates over every tracked option and its state, in option order.
    pub fn iter(&self) -> impl Iterator<Item = (TelnetOption, Verb)> + '_ {
        (0..=MAX_TRACKED_OPTION).map(move |code| {
            let index = code as usize / STATES_PER_BYTE;
            let shift = (code as usize % STATES_PER_BYTE) * 2;
            (
                TelnetOption::from_u8(code),
                Verb::from_bits(self.table[index] >> shift),
            )
        })
    }
}
