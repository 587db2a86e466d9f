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

use crate::{TelnetOption, Verb};

/// A Telnet command written by the console engine.
///
/// Console data is not framed; it goes through [`TelnetEncoder::put_data`](crate::TelnetEncoder::put_data).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TelnetFrame {
    /// `IAC GA`, the half-duplex turn marker
    GoAhead,
    /// `IAC WILL <option>`
    Will(TelnetOption),
    /// `IAC WONT <option>`
    Wont(TelnetOption),
    /// `IAC DO <option>`
    Do(TelnetOption),
    /// `IAC DONT <option>`
    Dont(TelnetOption),
}

impl TelnetFrame {
    /// Builds the three-byte negotiation frame for `verb` and `option`.
    pub fn negotiate(verb: Verb, option: TelnetOption) -> Self {
        match verb {
            Verb::Will => TelnetFrame::Will(option),
            Verb::Wont => TelnetFrame::Wont(option),
            Verb::Do => TelnetFrame::Do(option),
            Verb::Dont => TelnetFrame::Dont(option),
        }
    }

    /// Number of bytes the frame occupies on the wire.
    pub fn len(&self) -> usize {
        match self {
            TelnetFrame::GoAhead => 2,
            TelnetFrame::Will(_)
            | TelnetFrame::Wont(_)
            | TelnetFrame::Do(_)
            | TelnetFrame::Dont(_) => 3,
        }
    }

    /// Frames always carry at least one byte.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl std::fmt::Display for TelnetFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TelnetFrame::GoAhead => write!(f, "IAC GA"),
            TelnetFrame::Will(option) => write!(f, "IAC WILL {}", option),
            TelnetFrame::Wont(option) => write!(f, "IAC WONT {}", option),
            TelnetFrame::Do(option) => write!(f, "IAC DO {}", option),
            TelnetFrame::Dont(option) => write!(f, "IAC DONT {}", option),
        }
    }
}
