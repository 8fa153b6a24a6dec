use byteorder::ByteOrder;

/// The encode-side counterpart to [`super::Buf`]: appends wire primitives to a growing
/// `Vec<u8>` used as the outgoing packet body.
pub(crate) trait BufMut {
    fn put_u8(&mut self, val: u8);

    fn put_u16<T: ByteOrder>(&mut self, val: u16);

    fn put_u24<T: ByteOrder>(&mut self, val: u32);

    fn put_u32<T: ByteOrder>(&mut self, val: u32);

    fn put_u64<T: ByteOrder>(&mut self, val: u64);

    fn put_f32<T: ByteOrder>(&mut self, val: f32);

    fn put_f64<T: ByteOrder>(&mut self, val: f64);

    fn put_bytes(&mut self, val: &[u8]);

    fn put_str(&mut self, val: &str);

    fn put_str_nul(&mut self, val: &str);

    /// Length-coded binary.
    fn put_uint_lenenc<T: ByteOrder>(&mut self, val: u64);

    /// Length-coded string: LCB length, then raw bytes.
    fn put_str_lenenc<T: ByteOrder>(&mut self, val: &str);

    fn put_bytes_lenenc<T: ByteOrder>(&mut self, val: &[u8]);
}

impl BufMut for Vec<u8> {
    fn put_u8(&mut self, val: u8) {
        self.push(val);
    }

    fn put_u16<T: ByteOrder>(&mut self, val: u16) {
        let mut buf = [0; 2];
        T::write_u16(&mut buf, val);
        self.extend_from_slice(&buf);
    }

    fn put_u24<T: ByteOrder>(&mut self, val: u32) {
        let mut buf = [0; 3];
        T::write_u24(&mut buf, val);
        self.extend_from_slice(&buf);
    }

    fn put_u32<T: ByteOrder>(&mut self, val: u32) {
        let mut buf = [0; 4];
        T::write_u32(&mut buf, val);
        self.extend_from_slice(&buf);
    }

    fn put_u64<T: ByteOrder>(&mut self, val: u64) {
        let mut buf = [0; 8];
        T::write_u64(&mut buf, val);
        self.extend_from_slice(&buf);
    }

    fn put_f32<T: ByteOrder>(&mut self, val: f32) {
        let mut buf = [0; 4];
        T::write_f32(&mut buf, val);
        self.extend_from_slice(&buf);
    }

    fn put_f64<T: ByteOrder>(&mut self, val: f64) {
        let mut buf = [0; 8];
        T::write_f64(&mut buf, val);
        self.extend_from_slice(&buf);
    }

    fn put_bytes(&mut self, val: &[u8]) {
        self.extend_from_slice(val);
    }

    fn put_str(&mut self, val: &str) {
        self.extend_from_slice(val.as_bytes());
    }

    fn put_str_nul(&mut self, val: &str) {
        self.put_str(val);
        self.push(0);
    }

    fn put_uint_lenenc<T: ByteOrder>(&mut self, val: u64) {
        if val < 251 {
            self.put_u8(val as u8);
        } else if val <= 0xFFFF {
            self.put_u8(0xFC);
            self.put_u16::<T>(val as u16);
        } else if val <= 0xFF_FFFF {
            self.put_u8(0xFD);
            self.put_u24::<T>(val as u32);
        } else {
            self.put_u8(0xFE);
            self.put_u64::<T>(val);
        }
    }

    fn put_str_lenenc<T: ByteOrder>(&mut self, val: &str) {
        self.put_bytes_lenenc::<T>(val.as_bytes());
    }

    fn put_bytes_lenenc<T: ByteOrder>(&mut self, val: &[u8]) {
        self.put_uint_lenenc::<T>(val.len() as u64);
        self.put_bytes(val);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::Buf;
    use byteorder::LittleEndian;

    #[test]
    fn it_round_trips_lenenc_across_every_width_bucket() {
        for &n in &[0u64, 1, 250, 251, 0xFFFF, 0x1_0000, 0xFF_FFFF, 0x100_0000, u64::MAX] {
            let mut buf = Vec::new();
            buf.put_uint_lenenc::<LittleEndian>(n);

            let expected_len = match n {
                v if v < 251 => 1,
                v if v <= 0xFFFF => 3,
                v if v <= 0xFF_FFFF => 4,
                _ => 9,
            };
            assert_eq!(buf.len(), expected_len, "n = {}", n);

            let mut cursor: &[u8] = &buf;
            assert_eq!(cursor.get_uint_lenenc().unwrap().value(), Some(n));
        }
    }

    #[test]
    fn it_round_trips_lenenc_strings() {
        let mut buf = Vec::new();
        buf.put_str_lenenc::<LittleEndian>("hello world");

        let mut cursor: &[u8] = &buf;
        match cursor.get_str_lenenc().unwrap() {
            crate::io::buf::LenEncStr::Value(s) => assert_eq!(s, "hello world"),
            _ => panic!("expected Value"),
        }
    }
}
