use byteorder::{ByteOrder, LittleEndian};
use memchr::memchr;
use std::{io, str};

/// Result of decoding a length-coded binary (LCB) prefix.
///
/// `Incomplete` is distinguished from an outright decode error: the caller is expected
/// to fetch more bytes (the next physical frame of a fragmented logical packet) and
/// retry from the same cursor position. `consume_uint_lenenc` only advances the cursor
/// on `Null` or `Value`; on `Incomplete` the buffer is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LenEnc {
    Null,
    Incomplete,
    Value(u64),
}

impl LenEnc {
    pub(crate) fn value(self) -> Option<u64> {
        match self {
            LenEnc::Value(v) => Some(v),
            _ => None,
        }
    }
}

/// A consuming cursor over an immutable byte slice.
///
/// Every `get_*` method advances the cursor by the number of bytes read; there is no
/// non-consuming peek variant because the row decoder always operates on a fully
/// reassembled logical packet (see the packet framer's large-payload reassembly).
pub(crate) trait Buf<'a> {
    fn advance(&mut self, cnt: usize);

    fn get_u8(&mut self) -> io::Result<u8>;

    fn get_i8(&mut self) -> io::Result<i8>;

    fn get_u16<T: ByteOrder>(&mut self) -> io::Result<u16>;

    fn get_u24<T: ByteOrder>(&mut self) -> io::Result<u32>;

    fn get_u32<T: ByteOrder>(&mut self) -> io::Result<u32>;

    fn get_u64<T: ByteOrder>(&mut self) -> io::Result<u64>;

    fn get_f32<T: ByteOrder>(&mut self) -> io::Result<f32>;

    fn get_f64<T: ByteOrder>(&mut self) -> io::Result<f64>;

    fn get_str(&mut self, len: usize) -> io::Result<&'a str>;

    fn get_str_nul(&mut self) -> io::Result<&'a str>;

    fn get_bytes(&mut self, len: usize) -> io::Result<&'a [u8]>;

    /// Length-coded binary: 0..250 literal, 251 NULL, 252/253/254 widen to u16/u24/u64,
    /// 255 is reserved and is a protocol error.
    fn get_uint_lenenc(&mut self) -> io::Result<LenEnc>;

    /// Length-coded string: an LCB length followed by that many raw bytes.
    fn get_str_lenenc(&mut self) -> io::Result<LenEncStr<'a>>;

    /// Length-coded byte string, as `get_str_lenenc` but without UTF-8 validation.
    fn get_bytes_lenenc(&mut self) -> io::Result<Option<&'a [u8]>>;
}

/// The string-flavored sibling of [`LenEnc`]; kept distinct so callers that only ever
/// expect text don't have to match on a numeric `Value`.
pub(crate) enum LenEncStr<'a> {
    Null,
    Incomplete,
    Value(&'a str),
}

fn eof() -> io::Error {
    io::Error::from(io::ErrorKind::UnexpectedEof)
}

impl<'a> Buf<'a> for &'a [u8] {
    fn advance(&mut self, cnt: usize) {
        *self = &self[cnt..];
    }

    fn get_u8(&mut self) -> io::Result<u8> {
        let val = *self.first().ok_or_else(eof)?;
        self.advance(1);
        Ok(val)
    }

    fn get_i8(&mut self) -> io::Result<i8> {
        self.get_u8().map(|v| v as i8)
    }

    fn get_u16<T: ByteOrder>(&mut self) -> io::Result<u16> {
        if self.len() < 2 {
            return Err(eof());
        }
        let val = T::read_u16(self);
        self.advance(2);
        Ok(val)
    }

    fn get_u24<T: ByteOrder>(&mut self) -> io::Result<u32> {
        if self.len() < 3 {
            return Err(eof());
        }
        let val = T::read_u24(self);
        self.advance(3);
        Ok(val)
    }

    fn get_u32<T: ByteOrder>(&mut self) -> io::Result<u32> {
        if self.len() < 4 {
            return Err(eof());
        }
        let val = T::read_u32(self);
        self.advance(4);
        Ok(val)
    }

    fn get_u64<T: ByteOrder>(&mut self) -> io::Result<u64> {
        if self.len() < 8 {
            return Err(eof());
        }
        let val = T::read_u64(self);
        self.advance(8);
        Ok(val)
    }

    fn get_f32<T: ByteOrder>(&mut self) -> io::Result<f32> {
        if self.len() < 4 {
            return Err(eof());
        }
        let val = T::read_f32(self);
        self.advance(4);
        Ok(val)
    }

    fn get_f64<T: ByteOrder>(&mut self) -> io::Result<f64> {
        if self.len() < 8 {
            return Err(eof());
        }
        let val = T::read_f64(self);
        self.advance(8);
        Ok(val)
    }

    fn get_str(&mut self, len: usize) -> io::Result<&'a str> {
        let bytes = self.get_bytes(len)?;
        str::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    fn get_str_nul(&mut self) -> io::Result<&'a str> {
        let end = memchr(0, self).ok_or_else(eof)?;
        let s = self.get_str(end)?;
        self.advance(1); // the NUL terminator itself
        Ok(s)
    }

    fn get_bytes(&mut self, len: usize) -> io::Result<&'a [u8]> {
        if self.len() < len {
            return Err(eof());
        }
        let (bytes, rest) = self.split_at(len);
        *self = rest;
        Ok(bytes)
    }

    fn get_uint_lenenc(&mut self) -> io::Result<LenEnc> {
        let mut probe = *self;
        let header = match probe.get_u8() {
            Ok(b) => b,
            Err(_) => return Ok(LenEnc::Incomplete),
        };

        let (width, value) = match header {
            0xFB => {
                *self = probe;
                return Ok(LenEnc::Null);
            }
            0xFF => return Err(protocol_lenenc_err()),
            0xFC => (2usize, probe.get_u16::<LittleEndian>().map(u64::from)),
            0xFD => (3usize, probe.get_u24::<LittleEndian>().map(u64::from)),
            0xFE => (8usize, probe.get_u64::<LittleEndian>()),
            literal => {
                *self = probe;
                return Ok(LenEnc::Value(u64::from(literal)));
            }
        };

        match value {
            Ok(v) => {
                let _ = width;
                *self = probe;
                Ok(LenEnc::Value(v))
            }
            Err(_) => Ok(LenEnc::Incomplete),
        }
    }

    fn get_str_lenenc(&mut self) -> io::Result<LenEncStr<'a>> {
        let mut probe = *self;
        match probe.get_uint_lenenc()? {
            LenEnc::Null => {
                *self = probe;
                Ok(LenEncStr::Null)
            }
            LenEnc::Incomplete => Ok(LenEncStr::Incomplete),
            LenEnc::Value(len) => {
                if (probe.len() as u64) < len {
                    return Ok(LenEncStr::Incomplete);
                }
                let s = probe.get_str(len as usize)?;
                *self = probe;
                Ok(LenEncStr::Value(s))
            }
        }
    }

    fn get_bytes_lenenc(&mut self) -> io::Result<Option<&'a [u8]>> {
        let mut probe = *self;
        match probe.get_uint_lenenc()? {
            LenEnc::Null => {
                *self = probe;
                Ok(None)
            }
            LenEnc::Incomplete => Err(eof()),
            LenEnc::Value(len) => {
                let bytes = probe.get_bytes(len as usize)?;
                *self = probe;
                Ok(Some(bytes))
            }
        }
    }
}

fn protocol_lenenc_err() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, "0xFF is a reserved length-coded binary prefix")
}
