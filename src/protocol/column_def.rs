use byteorder::LittleEndian;

use crate::io::Buf;
use crate::protocol::column_type::{ColumnType, FieldFlags};

/// https://dev.mysql.com/doc/dev/mysql-server/latest/page_protocol_com_query_response_text_resultset_column_definition.html
/// https://mariadb.com/kb/en/resultset/#column-definition-packet
#[derive(Debug)]
pub struct ColumnDefinition {
    pub schema: Option<Box<str>>,
    pub table_alias: Option<Box<str>>,
    pub table: Option<Box<str>>,
    pub column_alias: Option<Box<str>>,
    pub column: Option<Box<str>>,
    pub char_set: u16,
    pub max_size: u32,
    pub column_type: ColumnType,
    pub flags: FieldFlags,
    pub decimals: u8,
}

impl ColumnDefinition {
    pub fn name(&self) -> Option<&str> {
        self.column_alias.as_deref().or(self.column.as_deref())
    }

    pub(crate) fn read(mut buf: &[u8]) -> crate::Result<Self> {
        let catalog = buf.get_str_lenenc()?;
        match catalog {
            crate::io::LenEncStr::Value("def") => {}
            other => {
                return Err(protocol_err!(
                    "expected column definition catalog \"def\"; received {:?}",
                    lenenc_str_debug(other)
                )
                .into())
            }
        }

        let schema = lenenc_opt(buf.get_str_lenenc()?);
        let table_alias = lenenc_opt(buf.get_str_lenenc()?);
        let table = lenenc_opt(buf.get_str_lenenc()?);
        let column_alias = lenenc_opt(buf.get_str_lenenc()?);
        let column = lenenc_opt(buf.get_str_lenenc()?);

        let len_fixed_fields = buf.get_uint_lenenc()?.value().unwrap_or(0);
        if len_fixed_fields != 0x0c {
            return Err(protocol_err!(
                "expected column definition fixed-length fields marker (0x0c); received {:#x}",
                len_fixed_fields
            )
            .into());
        }

        let char_set = buf.get_u16::<LittleEndian>()?;
        let max_size = buf.get_u32::<LittleEndian>()?;
        let column_type = ColumnType(buf.get_u8()?);
        let flags = FieldFlags::from_bits_truncate(buf.get_u16::<LittleEndian>()?);
        let decimals = buf.get_u8()?;

        Ok(Self {
            schema,
            table_alias,
            table,
            column_alias,
            column,
            char_set,
            max_size,
            column_type,
            flags,
            decimals,
        })
    }
}

fn lenenc_opt(s: crate::io::LenEncStr<'_>) -> Option<Box<str>> {
    match s {
        crate::io::LenEncStr::Value(v) => Some(v.into()),
        _ => None,
    }
}

fn lenenc_str_debug(s: crate::io::LenEncStr<'_>) -> Option<&str> {
    match s {
        crate::io::LenEncStr::Value(v) => Some(v),
        _ => None,
    }
}
