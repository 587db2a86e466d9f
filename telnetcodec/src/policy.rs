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

//! Server-side answers to option negotiation.
//!
//! The console offers to echo and to suppress go-ahead, asks the client for its window size,
//! and refuses everything else. Replies are unconditional: every received verb is answered,
//! and the answer itself is what the [`OptionStore`] records.

use crate::{OptionStore, TelnetFrame, TelnetOption, Verb};

/// A reply to send for one option, and the state it leaves the option in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Negotiation {
    /// Option being answered
    pub option: TelnetOption,
    /// Verb sent back to the peer, also the state recorded for the option
    pub reply: Verb,
}

impl Negotiation {
    /// Creates a negotiation for `option` answered with `reply`.
    pub fn new(option: TelnetOption, reply: Verb) -> Self {
        Negotiation { option, reply }
    }

    /// State the option store records once the reply is sent.
    pub fn resulting_state(&self) -> Verb {
        self.reply
    }

    /// Wire frame carrying the reply.
    pub fn frame(&self) -> TelnetFrame {
        TelnetFrame::negotiate(self.reply, self.option)
    }
}

/// Decides the reply to `received` for `option`.
pub fn decide(option: TelnetOption, received: Verb) -> Negotiation {
    let reply = match (option, received.is_offer()) {
        (TelnetOption::Echo, true) => Verb::Dont,
        (TelnetOption::Echo, false) => Verb::Will,
        (TelnetOption::SuppressGoAhead | TelnetOption::NAWS, true) => Verb::Do,
        (TelnetOption::SuppressGoAhead | TelnetOption::NAWS, false) => Verb::Will,
        (_, true) => Verb::Dont,
        (_, false) => Verb::Wont,
    };
    Negotiation::new(option, reply)
}

/// Frames forced onto a freshly accepted connection, in send order.
///
/// Echo and SGA are asserted twice each regardless of state; NAWS is requested unless the
/// store already holds DO for it.
pub fn baseline(store: &OptionStore) -> Vec<Negotiation> {
    let mut frames = vec![
        Negotiation::new(TelnetOption::Echo, Verb::Dont),
        Negotiation::new(TelnetOption::Echo, Verb::Will),
        Negotiation::new(TelnetOption::SuppressGoAhead, Verb::Do),
        Negotiation::new(TelnetOption::SuppressGoAhead, Verb::Will),
    ];
    if store.get(TelnetOption::NAWS) != Ok(Verb::Do) {
        frames.push(Negotiation::new(TelnetOption::NAWS, Verb::Do));
    }
    frames
}
