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

//! Login prompt for the console
//!
//! The login runs over the same byte stream as the console itself, after the Telnet
//! parser, so negotiations that arrive while the user types are still answered. Reads
//! never block: when the client goes quiet the gate returns and picks up where it left
//! off on the next call.

use crate::{ClientStream, ConnectionRecord, ConsoleResult, Inbound};
use consolenet_telnetcodec::consts;
use tracing::{debug, trace};

/// Longest identity or secret accepted, in characters.
pub const MAX_LINE_LENGTH: usize = 34;

const IDENTITY_PROMPT: &[u8] = b"User: ";
const SECRET_PROMPT: &[u8] = b"Pswd: ";
const ERASE: &[u8] = &[consts::BS, consts::SP, consts::BS];
const NEWLINE: &[u8] = &[consts::CR, consts::LF];

/// Effect of one byte on a [`LineEditor`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LineEdit {
    /// The byte was appended to the line
    Inserted(u8),
    /// The last character was removed
    Erased,
    /// Backspace on an empty line
    Bell,
    /// Carriage return ended the line
    Complete,
    /// The byte was dropped
    Ignored,
}

impl LineEdit {
    /// Bytes echoed back to the terminal for this edit.
    ///
    /// Completion always echoes a newline; everything else only when `echo` is set.
    pub fn echo(&self, echo: bool) -> &[u8] {
        match self {
            LineEdit::Complete => NEWLINE,
            _ if !echo => &[],
            LineEdit::Inserted(byte) => std::slice::from_ref(byte),
            LineEdit::Erased => ERASE,
            LineEdit::Bell => &[consts::BEL],
            LineEdit::Ignored => &[],
        }
    }
}

/// Bounded single-line editor.
#[derive(Clone, Debug, Default)]
pub struct LineEditor {
    line: Vec<u8>,
}

impl LineEditor {
    /// Creates an empty editor.
    pub fn new() -> Self {
        Self {
            line: Vec::with_capacity(MAX_LINE_LENGTH),
        }
    }

    /// Applies one input byte.
    pub fn push(&mut self, byte: u8) -> LineEdit {
        match byte {
            consts::CR => LineEdit::Complete,
            consts::BS | consts::DEL => {
                if self.line.pop().is_some() {
                    LineEdit::Erased
                } else {
                    LineEdit::Bell
                }
            }
            consts::SP..=consts::TILDE if self.line.len() < MAX_LINE_LENGTH => {
                self.line.push(byte);
                LineEdit::Inserted(byte)
            }
            _ => {
                trace!("Dropped input byte {:#X}", byte);
                LineEdit::Ignored
            }
        }
    }

    /// Removes and returns the line typed so far.
    pub fn take_line(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.line)
    }

    /// Characters typed so far.
    pub fn len(&self) -> usize {
        self.line.len()
    }

    /// True if nothing has been typed.
    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }

    /// Discards the partial line.
    pub fn clear(&mut self) {
        self.line.clear();
    }
}

/// Outcome of polling the [`Authenticator`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AuthStatus {
    /// Waiting on the client
    Pending,
    /// Both identity and secret matched
    Success,
    /// Identity or secret did not match
    Failure,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Stage {
    PromptIdentity,
    Identity,
    PromptSecret,
    Secret,
}

/// Resumable identity and secret check.
#[derive(Clone, Debug)]
pub struct Authenticator {
    identity: Vec<u8>,
    secret: Vec<u8>,
    echo_secret: bool,
    stage: Stage,
    editor: LineEditor,
}

impl Authenticator {
    /// Creates a gate expecting `identity` and `secret`.
    pub fn new(identity: impl Into<Vec<u8>>, secret: impl Into<Vec<u8>>, echo_secret: bool) -> Self {
        Self {
            identity: identity.into(),
            secret: secret.into(),
            echo_secret,
            stage: Stage::PromptIdentity,
            editor: LineEditor::new(),
        }
    }

    /// Starts over at the identity prompt.
    pub fn reset(&mut self) {
        self.stage = Stage::PromptIdentity;
        self.editor.clear();
    }

    /// Advances the login as far as the client's input allows.
    ///
    /// The identity is checked as soon as its line is complete; a mismatch fails without
    /// asking for the secret. The gate resets itself after every verdict.
    pub async fn authenticate<S: ClientStream>(
        &mut self,
        conn: &mut ConnectionRecord<S>,
    ) -> ConsoleResult<AuthStatus> {
        loop {
            match self.stage {
                Stage::PromptIdentity => {
                    conn.write_data(IDENTITY_PROMPT).await?;
                    self.stage = Stage::Identity;
                }
                Stage::Identity => {
                    let Some(line) = self.read_line(conn, true).await? else {
                        return Ok(AuthStatus::Pending);
                    };
                    if line != self.identity {
                        debug!("Unknown identity");
                        self.reset();
                        return Ok(AuthStatus::Failure);
                    }
                    self.stage = Stage::PromptSecret;
                }
                Stage::PromptSecret => {
                    conn.write_data(SECRET_PROMPT).await?;
                    self.stage = Stage::Secret;
                }
                Stage::Secret => {
                    let Some(line) = self.read_line(conn, self.echo_secret).await? else {
                        return Ok(AuthStatus::Pending);
                    };
                    self.reset();
                    return Ok(if line == self.secret {
                        AuthStatus::Success
                    } else {
                        debug!("Wrong secret");
                        AuthStatus::Failure
                    });
                }
            }
        }
    }

    /// Reads until carriage return, returning `None` if the client goes quiet first.
    ///
    /// The partial line is kept across calls.
    pub async fn read_line<S: ClientStream>(
        &mut self,
        conn: &mut ConnectionRecord<S>,
        echo: bool,
    ) -> ConsoleResult<Option<Vec<u8>>> {
        loop {
            let byte = match conn.read_input().await? {
                Inbound::Quiet => return Ok(None),
                Inbound::Absorbed => continue,
                Inbound::Data(byte) => byte,
            };
            let edit = self.editor.push(byte);
            conn.write_data(edit.echo(echo)).await?;
            if edit == LineEdit::Complete {
                return Ok(Some(self.editor.take_line()));
            }
        }
    }
}
