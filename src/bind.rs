use byteorder::LittleEndian;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::error::Error;
use crate::io::BufMut;
use crate::protocol::ColumnType;

/// A bound prepared-statement argument, already reduced to its binary-protocol
/// encoding (or `None` for SQL NULL).
pub(crate) struct BoundValue {
    pub(crate) column_type: ColumnType,
    pub(crate) unsigned: bool,
    /// `None` for NULL; the null bitmap carries nullness, this field is skipped in
    /// the value section of COM_STMT_EXECUTE when `None`.
    pub(crate) bytes: Option<Vec<u8>>,
}

/// Host types that can be bound as a prepared-statement parameter.
///
/// Implemented for the host types named in the type-dispatch table: integers of every
/// width and signedness, `bool`, `f32`/`f64`, `&str`/`String`, `&[u8]`/`Vec<u8>`, the
/// three `chrono::Naive*` temporal types, and `Option<T>` for any `T: BindParameter`
/// (the `None` case encodes as SQL NULL).
pub trait BindParameter {
    fn bind(&self) -> Result<BoundValue, Error>;
}

impl<T: BindParameter> BindParameter for Option<T> {
    fn bind(&self) -> Result<BoundValue, Error> {
        match self {
            Some(v) => v.bind(),
            None => Ok(BoundValue {
                column_type: ColumnType::NULL,
                unsigned: false,
                bytes: None,
            }),
        }
    }
}

macro_rules! impl_bind_int {
    ($ty:ty, $column_type:expr, $unsigned:expr, $put:ident) => {
        impl BindParameter for $ty {
            fn bind(&self) -> Result<BoundValue, Error> {
                let mut bytes = Vec::new();
                bytes.$put::<LittleEndian>(*self as _);
                Ok(BoundValue {
                    column_type: $column_type,
                    unsigned: $unsigned,
                    bytes: Some(bytes),
                })
            }
        }
    };
}

impl BindParameter for i8 {
    fn bind(&self) -> Result<BoundValue, Error> {
        Ok(BoundValue {
            column_type: ColumnType::TINY,
            unsigned: false,
            bytes: Some(vec![*self as u8]),
        })
    }
}

impl BindParameter for u8 {
    fn bind(&self) -> Result<BoundValue, Error> {
        Ok(BoundValue {
            column_type: ColumnType::TINY,
            unsigned: true,
            bytes: Some(vec![*self]),
        })
    }
}

impl_bind_int!(i16, ColumnType::SHORT, false, put_u16);
impl_bind_int!(u16, ColumnType::SHORT, true, put_u16);
impl_bind_int!(i32, ColumnType::LONG, false, put_u32);
impl_bind_int!(u32, ColumnType::LONG, true, put_u32);
impl_bind_int!(i64, ColumnType::LONGLONG, false, put_u64);
impl_bind_int!(u64, ColumnType::LONGLONG, true, put_u64);

impl BindParameter for f32 {
    fn bind(&self) -> Result<BoundValue, Error> {
        let mut bytes = Vec::new();
        bytes.put_f32::<LittleEndian>(*self);
        Ok(BoundValue {
            column_type: ColumnType::FLOAT,
            unsigned: false,
            bytes: Some(bytes),
        })
    }
}

impl BindParameter for f64 {
    fn bind(&self) -> Result<BoundValue, Error> {
        let mut bytes = Vec::new();
        bytes.put_f64::<LittleEndian>(*self);
        Ok(BoundValue {
            column_type: ColumnType::DOUBLE,
            unsigned: false,
            bytes: Some(bytes),
        })
    }
}

impl BindParameter for bool {
    fn bind(&self) -> Result<BoundValue, Error> {
        // BIT, carried as a 1-byte length-coded string whose single byte is '0'/'1'
        let mut bytes = Vec::new();
        bytes.put_bytes_lenenc::<LittleEndian>(&[if *self { b'1' } else { b'0' }]);
        Ok(BoundValue {
            column_type: ColumnType::BIT,
            unsigned: false,
            bytes: Some(bytes),
        })
    }
}

impl BindParameter for str {
    fn bind(&self) -> Result<BoundValue, Error> {
        let mut bytes = Vec::new();
        bytes.put_str_lenenc::<LittleEndian>(self);
        Ok(BoundValue {
            column_type: ColumnType::VARCHAR,
            unsigned: false,
            bytes: Some(bytes),
        })
    }
}

impl BindParameter for String {
    fn bind(&self) -> Result<BoundValue, Error> {
        self.as_str().bind()
    }
}

impl BindParameter for &str {
    fn bind(&self) -> Result<BoundValue, Error> {
        str::bind(*self)
    }
}

impl BindParameter for [u8] {
    fn bind(&self) -> Result<BoundValue, Error> {
        let mut bytes = Vec::new();
        bytes.put_bytes_lenenc::<LittleEndian>(self);
        Ok(BoundValue {
            column_type: ColumnType::TINY_BLOB,
            unsigned: false,
            bytes: Some(bytes),
        })
    }
}

impl BindParameter for Vec<u8> {
    fn bind(&self) -> Result<BoundValue, Error> {
        self.as_slice().bind()
    }
}

impl BindParameter for &[u8] {
    fn bind(&self) -> Result<BoundValue, Error> {
        <[u8]>::bind(*self)
    }
}

/// MySQL's `DATE`/`DATETIME`/`TIMESTAMP` types only represent years 1000-9999; a
/// `chrono` value outside that range has no binary-protocol encoding.
fn check_year_in_range(year: i32) -> Result<(), Error> {
    if (1000..=9999).contains(&year) {
        Ok(())
    } else {
        Err(Error::UnsupportedParameter(
            "chrono date/time value outside MySQL's representable year range (1000-9999)",
        ))
    }
}

impl BindParameter for NaiveDate {
    fn bind(&self) -> Result<BoundValue, Error> {
        check_year_in_range(self.year())?;

        let mut bytes = vec![4u8];
        bytes.put_u16::<LittleEndian>(self.year() as u16);
        bytes.put_u8(self.month() as u8);
        bytes.put_u8(self.day() as u8);
        Ok(BoundValue {
            column_type: ColumnType::DATE,
            unsigned: false,
            bytes: Some(bytes),
        })
    }
}

impl BindParameter for NaiveTime {
    fn bind(&self) -> Result<BoundValue, Error> {
        let mut bytes = vec![8u8];
        bytes.put_u8(0); // not negative
        bytes.put_u32::<LittleEndian>(0); // days
        bytes.put_u8(self.hour() as u8);
        bytes.put_u8(self.minute() as u8);
        bytes.put_u8(self.second() as u8);
        Ok(BoundValue {
            column_type: ColumnType::TIME,
            unsigned: false,
            bytes: Some(bytes),
        })
    }
}

impl BindParameter for NaiveDateTime {
    fn bind(&self) -> Result<BoundValue, Error> {
        check_year_in_range(self.year())?;

        let mut bytes = vec![7u8];
        bytes.put_u16::<LittleEndian>(self.year() as u16);
        bytes.put_u8(self.month() as u8);
        bytes.put_u8(self.day() as u8);
        bytes.put_u8(self.hour() as u8);
        bytes.put_u8(self.minute() as u8);
        bytes.put_u8(self.second() as u8);
        Ok(BoundValue {
            column_type: ColumnType::DATETIME,
            unsigned: false,
            bytes: Some(bytes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_binds_signed_and_unsigned_integers_distinctly() {
        assert!(!42i32.bind().unwrap().unsigned);
        assert!(42u32.bind().unwrap().unsigned);
    }

    #[test]
    fn it_binds_none_as_null_with_no_bytes() {
        let bound: BoundValue = Option::<i32>::None.bind().unwrap();
        assert_eq!(bound.column_type, ColumnType::NULL);
        assert!(bound.bytes.is_none());
    }

    #[test]
    fn it_binds_some_through_to_inner_type() {
        let bound = Some(7i32).bind().unwrap();
        assert_eq!(bound.column_type, ColumnType::LONG);
        assert!(bound.bytes.is_some());
    }

    #[test]
    fn it_rejects_a_date_outside_the_representable_year_range() {
        let date = NaiveDate::from_ymd_opt(10_000, 1, 1).unwrap();
        assert!(matches!(date.bind().unwrap_err(), Error::UnsupportedParameter(_)));
    }

    #[test]
    fn it_binds_strings_as_length_coded() {
        let bound = "hi".bind().unwrap();
        assert_eq!(bound.column_type, ColumnType::VARCHAR);
        assert_eq!(bound.bytes.unwrap(), vec![2, b'h', b'i']);
    }
}
