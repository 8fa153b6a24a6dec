use byteorder::LittleEndian;
use chrono::{NaiveDate, NaiveTime};

use crate::error::Error;
use crate::io::{Buf, LenEncStr};
use crate::protocol::column_def::ColumnDefinition;
use crate::protocol::column_type::ColumnType;
use crate::value::Value;

/// Decodes one result row, given the result set's column definitions.
///
/// The packet framer (`crate::packet`) reassembles any payload spanning multiple
/// physical frames before handing it here, so this never needs to ask for more bytes
/// mid-column; a length-coded field that claims more bytes than remain is therefore a
/// genuine protocol violation, not a reassembly request.
pub(crate) fn decode_row(
    buf: &[u8],
    columns: &[ColumnDefinition],
    binary: bool,
) -> crate::Result<Vec<Value>> {
    if binary {
        decode_binary_row(buf, columns)
    } else {
        decode_text_row(buf, columns)
    }
}

fn decode_text_row(mut buf: &[u8], columns: &[ColumnDefinition]) -> crate::Result<Vec<Value>> {
    let mut values = Vec::with_capacity(columns.len());

    for column in columns {
        match buf.get_str_lenenc()? {
            LenEncStr::Null => values.push(Value::Null),
            LenEncStr::Incomplete => return Err(protocol_err!("truncated text row").into()),
            LenEncStr::Value(text) => values.push(text_value(column, text)?),
        }
    }

    Ok(values)
}

fn text_value(column: &ColumnDefinition, text: &str) -> crate::Result<Value> {
    use ColumnType as T;

    Ok(match column.column_type {
        T::TINY | T::SHORT | T::LONG | T::LONGLONG | T::INT24 | T::YEAR => {
            if column.flags.contains(crate::protocol::column_type::FieldFlags::UNSIGNED) {
                Value::U64(text.parse().map_err(|_| parse_err("integer", text))?)
            } else {
                Value::I64(text.parse().map_err(|_| parse_err("integer", text))?)
            }
        }
        T::FLOAT => Value::F32(text.parse().map_err(|_| parse_err("float", text))?),
        T::DOUBLE | T::NEWDECIMAL | T::DECIMAL => {
            Value::F64(text.parse().map_err(|_| parse_err("double", text))?)
        }
        T::BIT => Value::Bool(text.as_bytes().first() != Some(&0)),
        T::DATE => Value::Date(
            NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| parse_err("date", text))?,
        ),
        T::TIME => Value::Time(
            NaiveTime::parse_from_str(text, "%H:%M:%S").map_err(|_| parse_err("time", text))?,
        ),
        T::DATETIME | T::TIMESTAMP => Value::DateTime(
            chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
                .map_err(|_| parse_err("datetime", text))?,
        ),
        T::BLOB if column.char_set == 63 => Value::Bytes(text.as_bytes().to_vec()),
        T::NEWDATE | T::GEOMETRY => Value::Raw(text.as_bytes().to_vec()),
        _ => Value::String(text.to_owned()),
    })
}

fn parse_err(kind: &str, text: &str) -> Error {
    protocol_err!("could not parse {} from {:?}", kind, text).into()
}

fn decode_binary_row(mut buf: &[u8], columns: &[ColumnDefinition]) -> crate::Result<Vec<Value>> {
    let header = buf.get_u8()?;
    if header != 0 {
        return Err(protocol_err!("expected binary row header (0x00); received 0x{:X}", header).into());
    }

    let null_bitmap_len = (columns.len() + 9) / 8;
    let null_bitmap = buf.get_bytes(null_bitmap_len)?;

    let mut values = Vec::with_capacity(columns.len());

    for (i, column) in columns.iter().enumerate() {
        // 2 reserved bits at the front of byte 0; the payload's first null bit lives
        // at bit index i+2.
        let bit = i + 2;
        let is_null = null_bitmap[bit / 8] & (1 << (bit % 8)) != 0;

        if is_null {
            values.push(Value::Null);
            continue;
        }

        values.push(binary_value(&mut buf, column)?);
    }

    Ok(values)
}

fn binary_value(buf: &mut &[u8], column: &ColumnDefinition) -> crate::Result<Value> {
    use ColumnType as T;
    use crate::protocol::column_type::FieldFlags;

    let unsigned = column.flags.contains(FieldFlags::UNSIGNED);

    Ok(match column.column_type {
        T::TINY => {
            if unsigned {
                Value::U64(buf.get_u8()? as u64)
            } else {
                Value::I64(buf.get_i8()? as i64)
            }
        }
        T::SHORT | T::YEAR => {
            if unsigned {
                Value::U64(buf.get_u16::<LittleEndian>()? as u64)
            } else {
                Value::I64(buf.get_u16::<LittleEndian>()? as i16 as i64)
            }
        }
        T::LONG | T::INT24 => {
            if unsigned {
                Value::U64(buf.get_u32::<LittleEndian>()? as u64)
            } else {
                Value::I64(buf.get_u32::<LittleEndian>()? as i32 as i64)
            }
        }
        T::LONGLONG => {
            if unsigned {
                Value::U64(buf.get_u64::<LittleEndian>()?)
            } else {
                Value::I64(buf.get_u64::<LittleEndian>()? as i64)
            }
        }
        T::FLOAT => Value::F32(buf.get_f32::<LittleEndian>()?),
        T::DOUBLE => Value::F64(buf.get_f64::<LittleEndian>()?),
        T::NEWDECIMAL | T::DECIMAL => {
            let s = read_lenenc_str(buf)?;
            Value::F64(s.parse().map_err(|_| parse_err("decimal", s))?)
        }
        T::BIT => Value::Bool(read_lenenc_bytes(buf)?.first() != Some(&0)),
        T::DATE => Value::Date(read_binary_date(buf)?),
        T::TIME => Value::Time(read_binary_time(buf)?),
        T::DATETIME | T::TIMESTAMP => Value::DateTime(read_binary_datetime(buf)?),
        T::BLOB if column.char_set == 63 => Value::Bytes(read_lenenc_bytes(buf)?.to_vec()),
        T::NEWDATE | T::GEOMETRY => Value::Raw(read_lenenc_bytes(buf)?.to_vec()),
        _ => Value::String(read_lenenc_str(buf)?.to_owned()),
    })
}

fn read_lenenc_str<'a>(buf: &mut &'a [u8]) -> crate::Result<&'a str> {
    match buf.get_str_lenenc()? {
        LenEncStr::Value(s) => Ok(s),
        LenEncStr::Null => Err(protocol_err!("unexpected NULL length-coded string in non-null column").into()),
        LenEncStr::Incomplete => Err(protocol_err!("truncated length-coded string").into()),
    }
}

fn read_lenenc_bytes<'a>(buf: &mut &'a [u8]) -> crate::Result<&'a [u8]> {
    buf.get_bytes_lenenc()?
        .ok_or_else(|| protocol_err!("unexpected NULL length-coded bytes in non-null column").into())
}

fn read_binary_date(buf: &mut &[u8]) -> crate::Result<NaiveDate> {
    let len = buf.get_u8()?;
    if len == 0 {
        return Ok(NaiveDate::from_ymd_opt(0, 1, 1).unwrap());
    }

    let year = buf.get_u16::<LittleEndian>()?;
    let month = buf.get_u8()?;
    let day = buf.get_u8()?;

    if len > 4 {
        buf.advance((len - 4) as usize);
    }

    NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
        .ok_or_else(|| protocol_err!("invalid binary date {}-{}-{}", year, month, day).into())
}

fn read_binary_time(buf: &mut &[u8]) -> crate::Result<NaiveTime> {
    let len = buf.get_u8()?;
    if len == 0 {
        return Ok(NaiveTime::from_hms_opt(0, 0, 0).unwrap());
    }

    // negative flag, days
    let _negative = buf.get_u8()?;
    let days = buf.get_u32::<LittleEndian>()?;
    let hours = buf.get_u8()? as u32 + days * 24;
    let minutes = buf.get_u8()?;
    let seconds = buf.get_u8()?;

    if len > 8 {
        buf.advance((len - 8) as usize);
    }

    NaiveTime::from_hms_opt(hours, minutes as u32, seconds as u32)
        .ok_or_else(|| protocol_err!("invalid binary time").into())
}

fn read_binary_datetime(buf: &mut &[u8]) -> crate::Result<chrono::NaiveDateTime> {
    let len = buf.get_u8()?;
    if len == 0 {
        return Ok(NaiveDate::from_ymd_opt(0, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap());
    }

    let year = buf.get_u16::<LittleEndian>()?;
    let month = buf.get_u8()?;
    let day = buf.get_u8()?;

    let (hour, minute, second) = if len >= 7 {
        (buf.get_u8()?, buf.get_u8()?, buf.get_u8()?)
    } else {
        (0, 0, 0)
    };

    if len > 7 {
        buf.advance((len - 7) as usize);
    }

    let date = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
        .ok_or_else(|| Error::from(protocol_err!("invalid binary datetime date component")))?;
    date.and_hms_opt(hour as u32, minute as u32, second as u32)
        .ok_or_else(|| protocol_err!("invalid binary datetime time component").into())
}
