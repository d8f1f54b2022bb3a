pub(crate) const CR: u8 = b'\r';
pub(crate) const LF: u8 = b'\n';
pub(crate) const SP: u8 = b' ';
pub(crate) const ZERO: u8 = b'0';

/// Parse an unsigned decimal.  Returns `None` for empty input, any non digit, or overflow.
pub(crate) fn atoi(data: &[u8]) -> Option<usize> {
    if data.is_empty() {
        return None;
    }

    let mut val: usize = 0;
    for digit in data {
        if !digit.is_ascii_digit() {
            return None;
        }
        val = val.checked_mul(10)?.checked_add((digit - ZERO) as usize)?;
    }

    Some(val)
}

/// Right aligned decimal rendering of an integer without going through `core::fmt`.
pub(crate) struct AsciiInt([u8; 20]);

impl AsciiInt {
    pub(crate) fn as_bytes(&self) -> &[u8] {
        let start = self.0.iter().position(|b| *b != SP).unwrap_or(self.0.len());
        &self.0[start..]
    }
}

impl From<u64> for AsciiInt {
    fn from(value: u64) -> Self {
        let mut round = 0;
        let mut int = value;

        let mut ret_array = [SP; 20];
        loop {
            let rem = (int % 10) as u8;
            int /= 10;
            ret_array[19 - round] = rem + ZERO;
            if int == 0 {
                break;
            }
            round += 1;
        }

        AsciiInt(ret_array)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn test_atoi() {
        assert!(atoi("0".as_bytes()) == Some(0));
        assert!(atoi("5".as_bytes()) == Some(5));
        assert!(atoi("123".as_bytes()) == Some(123));
        assert!(atoi("0123456789".as_bytes()) == Some(123456789));
        assert!(atoi("".as_bytes()) == None);
        assert!(atoi("abc".as_bytes()) == None);
        assert!(atoi("123a456".as_bytes()) == None);
        assert!(atoi("-1".as_bytes()) == None);
        assert!(atoi("99999999999999999999999".as_bytes()) == None);
    }

    #[test]
    fn test_itoa() {
        let a: AsciiInt = 0u64.into();
        assert_eq!(a.as_bytes(), b"0");
        let a: AsciiInt = 200u64.into();
        assert_eq!(a.as_bytes(), b"200");
        let a: AsciiInt = 1203u64.into();
        assert_eq!(a.as_bytes(), b"1203");
        let a: AsciiInt = 100002u64.into();
        assert_eq!(a.as_bytes(), b"100002");
        let a: AsciiInt = u64::MAX.into();
        assert_eq!(a.as_bytes(), b"18446744073709551615");
    }
}
