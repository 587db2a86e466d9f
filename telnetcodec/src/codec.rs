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

use crate::{CodecError, TelnetFrame, consts};
use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;

/// Serializes [`TelnetFrame`]s and outbound console data.
///
/// Encoding into a [`BytesMut`] never fails; the [`Encoder`] impls share the codec's
/// error type so connection writers can propagate it with `?`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TelnetEncoder;

impl TelnetEncoder {
    /// Creates a new encoder.
    pub fn new() -> Self {
        TelnetEncoder
    }

    /// Appends the wire form of `frame` to `dst`.
    pub fn put_frame(&self, frame: &TelnetFrame, dst: &mut BytesMut) {
        dst.reserve(frame.len());
        match frame {
            TelnetFrame::GoAhead => {
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::GA);
            }
            TelnetFrame::Will(option) => {
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::WILL);
                dst.put_u8(option.to_u8());
            }
            TelnetFrame::Wont(option) => {
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::WONT);
                dst.put_u8(option.to_u8());
            }
            TelnetFrame::Do(option) => {
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::DO);
                dst.put_u8(option.to_u8());
            }
            TelnetFrame::Dont(option) => {
                dst.put_u8(consts::IAC);
                dst.put_u8(consts::DONT);
                dst.put_u8(option.to_u8());
            }
        }
    }

    /// Appends console data to `dst`, doubling every `IAC`.
    pub fn put_data(&self, data: &[u8], dst: &mut BytesMut) {
        dst.reserve(data.len());
        for byte in data {
            if *byte == consts::IAC {
                dst.put_u8(consts::IAC);
            }
            dst.put_u8(*byte);
        }
    }
}

impl Encoder<TelnetFrame> for TelnetEncoder {
    type Error = CodecError;

    fn encode(&mut self, item: TelnetFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.put_frame(&item, dst);
        Ok(())
    }
}

impl Encoder<&[u8]> for TelnetEncoder {
    type Error = CodecError;

    fn encode(&mut self, item: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.put_data(item, dst);
        Ok(())
    }
}
