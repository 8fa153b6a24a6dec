use crate::io::BufMut;

/// https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_com_stmt_prepare.html
#[derive(Debug)]
pub(crate) struct ComStmtPrepare<'a> {
    pub(crate) query: &'a str,
}

impl ComStmtPrepare<'_> {
    pub(crate) fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(0x16);
        buf.put_str(self.query);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_encodes_com_stmt_prepare() {
        let mut buf = Vec::new();
        ComStmtPrepare {
            query: "SELECT * FROM users WHERE id = ?",
        }
        .encode(&mut buf);

        assert_eq!(&buf[..1], &[0x16]);
        assert_eq!(&buf[1..], b"SELECT * FROM users WHERE id = ?");
    }
}
