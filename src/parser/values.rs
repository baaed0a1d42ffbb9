//! Typed value codec shared by every higher-level decoder.
//!
//! A value on the wire is a 1-byte type code followed by a payload whose
//! width depends on the type (and, for references, on the file's identifier
//! size). Field tables, static fields and constant-pool entries all decode
//! through [`read_value`].

use crate::parser::reader::{ByteReader, Id};
use crate::utils::config::{NULL_REFERENCE, REFERENCE_TYPE_CODE};
use crate::utils::error::HprofError;

/// The eight primitive types of the format, with their wire type codes and
/// encoded byte widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean = 4,
    Char = 5,
    Float = 6,
    Double = 7,
    Byte = 8,
    Short = 9,
    Int = 10,
    Long = 11,
}

impl PrimitiveType {
    /// Map a wire type code to a primitive type. Code 2 (reference) is not
    /// a primitive and yields `None`, as does any unknown code.
    pub fn from_type_code(code: u8) -> Option<PrimitiveType> {
        match code {
            4 => Some(PrimitiveType::Boolean),
            5 => Some(PrimitiveType::Char),
            6 => Some(PrimitiveType::Float),
            7 => Some(PrimitiveType::Double),
            8 => Some(PrimitiveType::Byte),
            9 => Some(PrimitiveType::Short),
            10 => Some(PrimitiveType::Int),
            11 => Some(PrimitiveType::Long),
            _ => None,
        }
    }

    /// Encoded width of one element of this type.
    pub fn byte_size(self) -> u32 {
        match self {
            PrimitiveType::Boolean | PrimitiveType::Byte => 1,
            PrimitiveType::Char | PrimitiveType::Short => 2,
            PrimitiveType::Float | PrimitiveType::Int => 4,
            PrimitiveType::Double | PrimitiveType::Long => 8,
        }
    }

    /// The wire type code of this primitive.
    pub fn type_code(self) -> u8 {
        self as u8
    }
}

/// One decoded, typed value.
///
/// Char values are raw UTF-16BE code units: lone surrogates are legal in a
/// dump and cannot be represented by `char`.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueHolder {
    /// An object reference of the file's identifier width.
    Reference { id: Id, size: u32 },
    Boolean(bool),
    Char(u16),
    Float(f32),
    Double(f64),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
}

impl ValueHolder {
    /// Encoded byte width of this value.
    pub fn byte_size(&self) -> u32 {
        match self {
            ValueHolder::Reference { size, .. } => *size,
            ValueHolder::Boolean(_) => PrimitiveType::Boolean.byte_size(),
            ValueHolder::Char(_) => PrimitiveType::Char.byte_size(),
            ValueHolder::Float(_) => PrimitiveType::Float.byte_size(),
            ValueHolder::Double(_) => PrimitiveType::Double.byte_size(),
            ValueHolder::Byte(_) => PrimitiveType::Byte.byte_size(),
            ValueHolder::Short(_) => PrimitiveType::Short.byte_size(),
            ValueHolder::Int(_) => PrimitiveType::Int.byte_size(),
            ValueHolder::Long(_) => PrimitiveType::Long.byte_size(),
        }
    }

    /// True for a reference value holding the null sentinel.
    pub fn is_null_reference(&self) -> bool {
        matches!(self, ValueHolder::Reference { id, .. } if *id == NULL_REFERENCE)
    }

    /// The target identifier of a non-null reference value.
    pub fn reference_id(&self) -> Option<Id> {
        match self {
            ValueHolder::Reference { id, .. } if *id != NULL_REFERENCE => Some(*id),
            _ => None,
        }
    }
}

/// Decode exactly one typed value for the given wire type code.
///
/// # Errors
/// * `HprofError::UnknownValueType` - the type code is neither a reference
///   nor one of the eight primitives
/// * `HprofError::TruncatedInput` - the payload runs past end of input
pub fn read_value(
    reader: &mut ByteReader<'_>,
    type_code: u8,
    identifier_byte_size: u32,
) -> Result<ValueHolder, HprofError> {
    if type_code == REFERENCE_TYPE_CODE {
        return Ok(ValueHolder::Reference {
            id: reader.read_id(identifier_byte_size)?,
            size: identifier_byte_size,
        });
    }
    match PrimitiveType::from_type_code(type_code) {
        Some(PrimitiveType::Boolean) => Ok(ValueHolder::Boolean(reader.read_bool()?)),
        Some(PrimitiveType::Char) => Ok(ValueHolder::Char(reader.read_char()?)),
        Some(PrimitiveType::Float) => Ok(ValueHolder::Float(reader.read_f32()?)),
        Some(PrimitiveType::Double) => Ok(ValueHolder::Double(reader.read_f64()?)),
        Some(PrimitiveType::Byte) => Ok(ValueHolder::Byte(reader.read_i8()?)),
        Some(PrimitiveType::Short) => Ok(ValueHolder::Short(reader.read_i16()?)),
        Some(PrimitiveType::Int) => Ok(ValueHolder::Int(reader.read_i32()?)),
        Some(PrimitiveType::Long) => Ok(ValueHolder::Long(reader.read_i64()?)),
        None => Err(HprofError::UnknownValueType(type_code)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_reference_value() {
        let data = [0x00, 0x00, 0x00, 0x2a];
        let mut r = ByteReader::new(&data);
        let v = read_value(&mut r, REFERENCE_TYPE_CODE, 4).unwrap();
        assert_eq!(v, ValueHolder::Reference { id: 42, size: 4 });
        assert_eq!(v.byte_size(), 4);
        assert_eq!(v.reference_id(), Some(42));
    }

    #[test]
    fn test_null_reference() {
        let data = [0x00; 8];
        let mut r = ByteReader::new(&data);
        let v = read_value(&mut r, REFERENCE_TYPE_CODE, 8).unwrap();
        assert!(v.is_null_reference());
        assert_eq!(v.reference_id(), None);
    }

    #[test]
    fn test_read_each_primitive() {
        let data = [
            0x01, // boolean true
            0x00, 0x41, // char 'A'
            0x3f, 0x80, 0x00, 0x00, // float 1.0
            0xff, // byte -1
            0x00, 0x07, // short 7
            0xff, 0xff, 0xff, 0xfe, // int -2
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x09, // long 9
        ];
        let mut r = ByteReader::new(&data);
        assert_eq!(read_value(&mut r, 4, 8).unwrap(), ValueHolder::Boolean(true));
        assert_eq!(read_value(&mut r, 5, 8).unwrap(), ValueHolder::Char(0x41));
        assert_eq!(read_value(&mut r, 6, 8).unwrap(), ValueHolder::Float(1.0));
        assert_eq!(read_value(&mut r, 8, 8).unwrap(), ValueHolder::Byte(-1));
        assert_eq!(read_value(&mut r, 9, 8).unwrap(), ValueHolder::Short(7));
        assert_eq!(read_value(&mut r, 10, 8).unwrap(), ValueHolder::Int(-2));
        assert_eq!(read_value(&mut r, 11, 8).unwrap(), ValueHolder::Long(9));
        assert!(r.is_exhausted());
    }

    #[test]
    fn test_unknown_type_code_is_fatal() {
        let data = [0x00; 4];
        let mut r = ByteReader::new(&data);
        assert!(matches!(
            read_value(&mut r, 3, 8),
            Err(HprofError::UnknownValueType(3))
        ));
    }
}
