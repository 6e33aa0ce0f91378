use byteorder::{BigEndian, ByteOrder};

use crate::{ClassFileError, Result};

type Endian = BigEndian;

/// Borrows `width` bytes starting at `offset`, failing instead of panicking
/// when the range runs past the end of `buf`.
pub fn slice(buf: &[u8], offset: usize, width: usize) -> Result<&[u8]> {
    offset
        .checked_add(width)
        .and_then(|end| buf.get(offset..end))
        .ok_or(ClassFileError::OutOfBounds {
            offset,
            width,
            len: buf.len(),
        })
}

pub fn read_u8(buf: &[u8], offset: usize) -> Result<u8> {
    Ok(slice(buf, offset, 1)?[0])
}

pub fn read_u16(buf: &[u8], offset: usize) -> Result<u16> {
    Ok(Endian::read_u16(slice(buf, offset, 2)?))
}

pub fn read_u32(buf: &[u8], offset: usize) -> Result<u32> {
    Ok(Endian::read_u32(slice(buf, offset, 4)?))
}

pub fn buffer_equals<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a == b)
}

#[cfg(test)]
mod read_tests {
    use super::*;

    #[test]
    fn it_should_read_big_endian_integers() {
        let buf = [0xca, 0xfe, 0xba, 0xbe, 0x00, 0x34];

        assert_eq!(read_u8(&buf, 1).unwrap(), 0xfe);
        assert_eq!(read_u16(&buf, 4).unwrap(), 52);
        assert_eq!(read_u32(&buf, 0).unwrap(), 0xCAFEBABE);
    }

    #[test]
    fn it_should_fail_if_there_is_not_enough_data() {
        let buf = [0x00, 0x01, 0x02];

        assert!(matches!(
            read_u32(&buf, 0),
            Err(ClassFileError::OutOfBounds {
                offset: 0,
                width: 4,
                len: 3
            })
        ));
        assert!(read_u16(&buf, 2).is_err());
        assert!(read_u8(&buf, 3).is_err());
    }

    #[test]
    fn it_should_not_overflow_on_huge_offsets() {
        assert!(slice(&[0u8; 4], usize::MAX, 2).is_err());
    }
}
