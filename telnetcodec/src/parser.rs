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

use crate::{
    CodecError, OptionStore, SubnegotiationErrorKind, TelnetEncoder, TelnetOption, Verb,
    WindowSize, consts,
    policy::{self, Negotiation},
};
use bytes::BytesMut;
use tracing::{debug, trace, warn};

/// Capacity of the subnegotiation capture buffer.
pub const SUBNEGOTIATION_CAPACITY: usize = 35;

/// Position of the parser within a Telnet command sequence.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ParserState {
    /// Plain data
    #[default]
    Idle,
    /// Received IAC, next byte is a command
    SawIac,
    /// Received a negotiation verb, next byte is the option
    SawVerb(Verb),
    /// Received IAC SB, next byte is the subnegotiation option
    SawSubnegBegin,
    /// Capturing subnegotiation payload bytes
    CapturingSubnegData,
    /// Received IAC inside a subnegotiation, next byte is SE or an escaped IAC
    SawSubnegEscape,
}

impl std::fmt::Display for ParserState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParserState::Idle => write!(f, "Idle"),
            ParserState::SawIac => write!(f, "SawIAC"),
            ParserState::SawVerb(verb) => write!(f, "SawVerb({})", verb),
            ParserState::SawSubnegBegin => write!(f, "SawSubnegBegin"),
            ParserState::CapturingSubnegData => write!(f, "CapturingSubnegData"),
            ParserState::SawSubnegEscape => write!(f, "SawSubnegEscape"),
        }
    }
}

/// Fixed-size capture of one subnegotiation payload.
#[derive(Clone, Debug)]
pub struct SubnegotiationBuffer {
    option: TelnetOption,
    data: [u8; SUBNEGOTIATION_CAPACITY],
    len: usize,
    dropped: usize,
}

impl SubnegotiationBuffer {
    /// Starts a new capture for `option`.
    pub fn begin(&mut self, option: TelnetOption) {
        self.option = option;
        self.len = 0;
        self.dropped = 0;
    }

    /// Appends a payload byte, returning `false` if the buffer was full and the byte dropped.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.len < SUBNEGOTIATION_CAPACITY {
            self.data[self.len] = byte;
            self.len += 1;
            true
        } else {
            self.dropped += 1;
            false
        }
    }

    /// Option the payload belongs to.
    pub fn option(&self) -> TelnetOption {
        self.option
    }

    /// Captured payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Number of bytes dropped since the capture began.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl Default for SubnegotiationBuffer {
    fn default() -> Self {
        SubnegotiationBuffer {
            option: TelnetOption::Unknown(consts::option::UNDEFINED),
            data: [0; SUBNEGOTIATION_CAPACITY],
            len: 0,
            dropped: 0,
        }
    }
}

/// Server-side Telnet byte parser.
///
/// Consumes one inbound byte at a time, answering option negotiation through the
/// [`policy`] and capturing subnegotiation payloads. Replies are queued in an outbound
/// buffer that the caller drains with [`TelnetParser::take_replies`] and writes to the
/// client; data bytes are handed straight back from [`TelnetParser::feed`].
#[derive(Clone, Debug)]
pub struct TelnetParser {
    state: ParserState,
    options: OptionStore,
    subnegotiation: SubnegotiationBuffer,
    window: WindowSize,
    encoder: TelnetEncoder,
    replies: BytesMut,
}

impl TelnetParser {
    /// Creates an idle parser assuming `window` until the client reports its size.
    pub fn new(window: WindowSize) -> Self {
        TelnetParser {
            state: ParserState::Idle,
            options: OptionStore::new(),
            subnegotiation: SubnegotiationBuffer::default(),
            window,
            encoder: TelnetEncoder::new(),
            replies: BytesMut::with_capacity(64),
        }
    }

    /// Returns the parser to its freshly created state.
    pub fn reset(&mut self, window: WindowSize) {
        self.state = ParserState::Idle;
        self.options.clear();
        self.subnegotiation = SubnegotiationBuffer::default();
        self.window = window;
        self.replies.clear();
    }

    /// Processes one inbound byte, returning it if it is console data.
    pub fn feed(&mut self, byte: u8) -> Option<u8> {
        match (self.state, byte) {
            (ParserState::Idle, consts::IAC) => {
                self.state = ParserState::SawIac;
                None
            }
            (ParserState::Idle, consts::GA) => {
                trace!("Absorbed bare GA byte");
                None
            }
            (ParserState::Idle, _) => Some(byte),
            (ParserState::SawIac, consts::SB) => {
                self.state = ParserState::SawSubnegBegin;
                None
            }
            (ParserState::SawIac, consts::IAC) => {
                self.state = ParserState::Idle;
                Some(consts::IAC)
            }
            (ParserState::SawIac, _) => {
                self.state = match Verb::from_command(byte) {
                    Some(verb) => ParserState::SawVerb(verb),
                    None => {
                        trace!("Absorbed command {:#X}", byte);
                        ParserState::Idle
                    }
                };
                None
            }
            (ParserState::SawVerb(verb), _) => {
                self.state = ParserState::Idle;
                let option = TelnetOption::from_u8(byte);
                debug!(%verb, %option, "Received negotiation");
                self.send_negotiation(policy::decide(option, verb));
                None
            }
            (ParserState::SawSubnegBegin, _) => {
                self.subnegotiation.begin(TelnetOption::from_u8(byte));
                self.state = ParserState::CapturingSubnegData;
                None
            }
            (ParserState::CapturingSubnegData, consts::IAC) => {
                self.state = ParserState::SawSubnegEscape;
                None
            }
            (ParserState::CapturingSubnegData, _) => {
                self.subnegotiation.push(byte);
                None
            }
            (ParserState::SawSubnegEscape, consts::SE) => {
                self.state = ParserState::Idle;
                self.dispatch_subnegotiation();
                None
            }
            (ParserState::SawSubnegEscape, consts::IAC) => {
                self.subnegotiation.push(consts::IAC);
                self.state = ParserState::CapturingSubnegData;
                None
            }
            (ParserState::SawSubnegEscape, _) => {
                self.state = ParserState::Idle;
                warn!(
                    option = %self.subnegotiation.option(),
                    "Received invalid command {:#X} during subnegotiation, payload discarded",
                    byte
                );
                self.subnegotiation = SubnegotiationBuffer::default();
                None
            }
        }
    }

    /// Negotiations forced onto a new connection, in sending order.
    ///
    /// Nothing is queued or recorded; the caller sends each frame on its own and calls
    /// [`TelnetParser::record`] once the frame is out.
    pub fn baseline(&self) -> Vec<Negotiation> {
        policy::baseline(&self.options)
    }

    fn send_negotiation(&mut self, negotiation: Negotiation) {
        self.encoder
            .put_frame(&negotiation.frame(), &mut self.replies);
        self.record(negotiation);
    }

    /// Records the state `negotiation` leaves its option in.
    ///
    /// Options outside the store range are answered but not recorded.
    pub fn record(&mut self, negotiation: Negotiation) {
        match self
            .options
            .set(negotiation.option, negotiation.resulting_state())
        {
            Ok(()) => trace!(
                option = %negotiation.option,
                state = %negotiation.resulting_state(),
                "Recorded option state"
            ),
            Err(err) => trace!(%err, "Answered untracked option"),
        }
    }

    fn dispatch_subnegotiation(&mut self) {
        let option = self.subnegotiation.option();
        let payload_len = self.subnegotiation.payload().len();
        let dropped = self.subnegotiation.dropped();
        if dropped > 0 {
            let err = CodecError::SubnegotiationError {
                option: option.to_u8(),
                reason: SubnegotiationErrorKind::Truncated { dropped },
            };
            warn!(%err, payload_len, dropped, "Subnegotiation payload truncated");
        }
        match option {
            TelnetOption::NAWS => match WindowSize::decode(self.subnegotiation.payload()) {
                Ok(reported) => {
                    self.window = self.window.update(reported);
                    debug!(window = %self.window, "Client reported window size");
                }
                Err(err) => warn!(%err, "Ignored NAWS subnegotiation"),
            },
            _ => warn!(%option, payload_len, "Ignored unsupported subnegotiation"),
        }
        self.subnegotiation = SubnegotiationBuffer::default();
    }

    /// Removes and returns every queued reply byte.
    pub fn take_replies(&mut self) -> BytesMut {
        self.replies.split()
    }

    /// True if replies are waiting to be written.
    pub fn has_replies(&self) -> bool {
        !self.replies.is_empty()
    }

    /// Current parser state.
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// True when the parser is between command sequences.
    pub fn is_idle(&self) -> bool {
        self.state == ParserState::Idle
    }

    /// Negotiated option states.
    pub fn options(&self) -> &OptionStore {
        &self.options
    }

    /// Terminal size, the default until the client reports one.
    pub fn window_size(&self) -> WindowSize {
        self.window
    }

    /// True when go-ahead must be signalled, which is when SGA is stored as WONT or DONT.
    pub fn go_ahead_required(&self) -> bool {
        matches!(
            self.options.get(TelnetOption::SuppressGoAhead),
            Ok(Verb::Wont | Verb::Dont)
        )
    }
}

impl Default for TelnetParser {
    fn default() -> Self {
        TelnetParser::new(WindowSize::default())
    }
}
