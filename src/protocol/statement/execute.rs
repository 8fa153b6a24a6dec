use byteorder::LittleEndian;

use crate::bind::BoundValue;
use crate::io::BufMut;

bitflags::bitflags! {
    /// https://mariadb.com/kb/en/com_stmt_execute/#flags
    pub(crate) struct Cursor: u8 {
        const NO_CURSOR = 0;
        const READ_ONLY = 1;
        const FOR_UPDATE = 2;
        const SCROLLABLE = 4;
    }
}

/// https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_com_stmt_execute.html
#[derive(Debug)]
pub(crate) struct ComStmtExecute<'a> {
    pub(crate) statement_id: u32,
    pub(crate) cursor: Cursor,
}

impl ComStmtExecute<'_> {
    pub(crate) fn encode(&self, buf: &mut Vec<u8>, params: &[BoundValue]) {
        buf.put_u8(0x17);
        buf.put_u32::<LittleEndian>(self.statement_id);
        buf.put_u8(self.cursor.bits());
        buf.put_u32::<LittleEndian>(1); // iteration count, always 1

        if params.is_empty() {
            return;
        }

        let null_bitmap_len = (params.len() + 7) / 8;
        let mut null_bitmap = vec![0u8; null_bitmap_len];
        for (i, p) in params.iter().enumerate() {
            if p.bytes.is_none() {
                null_bitmap[i / 8] |= 1 << (i % 8);
            }
        }
        buf.put_bytes(&null_bitmap);

        // new-types-bound
        buf.put_u8(1);

        for p in params {
            buf.put_u8(p.column_type.0);
            buf.put_u8(if p.unsigned { 0x80 } else { 0 });
        }

        for p in params {
            if let Some(bytes) = &p.bytes {
                buf.put_bytes(bytes);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::BindParameter;

    #[test]
    fn it_marks_null_parameters_in_the_bitmap() {
        let params = vec![
            42i32.bind().unwrap(),
            Option::<i32>::None.bind().unwrap(),
            7i32.bind().unwrap(),
        ];

        let mut buf = Vec::new();
        ComStmtExecute {
            statement_id: 1,
            cursor: Cursor::NO_CURSOR,
        }
        .encode(&mut buf, &params);

        // header(1) + id(4) + cursor(1) + iterations(4) = 10, then null bitmap
        assert_eq!(buf[10], 0b0000_0010);
    }
}
