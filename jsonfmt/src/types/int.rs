//! Decimal encoders for fixed-width integers.
//!
//! # Formatting
//!
//! Digits are produced least-significant first into a stack scratch array, two at a time through
//! a lookup table, and appended to the output with a single `put_slice`. No intermediate string
//! is ever allocated.
//!
//! There is one formatter per (width, signedness) pair. `isize` and `usize` have no formatter of
//! their own: they alias to the formatter of the platform's pointer width.

use crate::{Addr, Context, Encoder};
use bytes::BufMut;
use std::{any::Any, marker::PhantomData};

/// Pairs of decimal digits for every value in `0..100`.
const DIGITS: &[u8; 200] = b"\
    0001020304050607080910111213141516171819\
    2021222324252627282930313233343536373839\
    4041424344454647484950515253545556575859\
    6061626364656667686970717273747576777879\
    8081828384858687888990919293949596979899";

/// Longest possible output: `u64::MAX` and `i64::MIN` both render in 20 bytes.
const MAX_LEN: usize = 20;

/// Writes the digits of `n` into the tail of `scratch`, returning the index of the first digit.
#[inline]
fn format(mut n: u64, scratch: &mut [u8; MAX_LEN]) -> usize {
    let mut cur = MAX_LEN;
    while n >= 10_000 {
        let rem = (n % 10_000) as usize;
        n /= 10_000;
        let (hi, lo) = ((rem / 100) * 2, (rem % 100) * 2);
        cur -= 4;
        scratch[cur..cur + 2].copy_from_slice(&DIGITS[hi..hi + 2]);
        scratch[cur + 2..cur + 4].copy_from_slice(&DIGITS[lo..lo + 2]);
    }

    // At most 4 digits remain
    let mut n = n as usize;
    if n >= 100 {
        let pair = (n % 100) * 2;
        n /= 100;
        cur -= 2;
        scratch[cur..cur + 2].copy_from_slice(&DIGITS[pair..pair + 2]);
    }
    if n >= 10 {
        let pair = n * 2;
        cur -= 2;
        scratch[cur..cur + 2].copy_from_slice(&DIGITS[pair..pair + 2]);
    } else {
        cur -= 1;
        scratch[cur] = b'0' + n as u8;
    }
    cur
}

/// Integers that can be written as shortest-form decimal ASCII.
pub trait Decimal: Copy {
    /// Appends the decimal representation of `self` to `buf`.
    fn write_decimal(self, buf: &mut dyn BufMut);
}

macro_rules! impl_unsigned {
    ($type:ty) => {
        impl Decimal for $type {
            #[inline]
            fn write_decimal(self, buf: &mut dyn BufMut) {
                let mut scratch = [0u8; MAX_LEN];
                let start = format(self as u64, &mut scratch);
                buf.put_slice(&scratch[start..]);
            }
        }
    };
}

macro_rules! impl_signed {
    ($type:ty) => {
        impl Decimal for $type {
            #[inline]
            fn write_decimal(self, buf: &mut dyn BufMut) {
                let mut scratch = [0u8; MAX_LEN];
                let mut start = format(self.unsigned_abs() as u64, &mut scratch);
                if self < 0 {
                    start -= 1;
                    scratch[start] = b'-';
                }
                buf.put_slice(&scratch[start..]);
            }
        }
    };
}

impl_unsigned!(u8);
impl_unsigned!(u16);
impl_unsigned!(u32);
impl_unsigned!(u64);
impl_signed!(i8);
impl_signed!(i16);
impl_signed!(i32);
impl_signed!(i64);

/// Integer storage types an [Int] encoder can read a value as.
pub trait Integer: Any + Copy {
    /// The fixed-width integer whose formatter renders this type.
    type Repr: Decimal;

    fn repr(self) -> Self::Repr;
}

macro_rules! impl_integer {
    ($type:ty, $repr:ty) => {
        impl Integer for $type {
            type Repr = $repr;

            #[inline]
            fn repr(self) -> $repr {
                self as $repr
            }
        }
    };
}

impl_integer!(i8, i8);
impl_integer!(i16, i16);
impl_integer!(i32, i32);
impl_integer!(i64, i64);
impl_integer!(u8, u8);
impl_integer!(u16, u16);
impl_integer!(u32, u32);
impl_integer!(u64, u64);

#[cfg(target_pointer_width = "16")]
impl_integer!(isize, i16);
#[cfg(target_pointer_width = "16")]
impl_integer!(usize, u16);
#[cfg(target_pointer_width = "32")]
impl_integer!(isize, i32);
#[cfg(target_pointer_width = "32")]
impl_integer!(usize, u32);
#[cfg(target_pointer_width = "64")]
impl_integer!(isize, i64);
#[cfg(target_pointer_width = "64")]
impl_integer!(usize, u64);

/// Encodes a `T` as a JSON number.
pub struct Int<T>(PhantomData<fn() -> T>);

impl<T: Integer> Int<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T: Integer> Default for Int<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Integer> Encoder for Int<T> {
    #[inline]
    fn encode(&self, _: Context<'_>, buf: &mut dyn BufMut, value: Addr<'_>) {
        value.get::<T>().repr().write_decimal(buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EncoderExt;
    use paste::paste;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn encode<T: Integer>(value: T) -> String {
        let encoded = Int::<T>::new().encode_to_bytes(Context::none(), Addr::of(&value));
        String::from_utf8(encoded.to_vec()).unwrap()
    }

    macro_rules! impl_int_test {
        ($type:ty) => {
            paste! {
                #[test]
                fn [<test_ $type>]() {
                    let values: [$type; 6] = [
                        0 as $type,
                        1 as $type,
                        9 as $type,
                        <$type>::MAX,
                        <$type>::MIN,
                        <$type>::MAX / 7,
                    ];
                    for value in values {
                        assert_eq!(encode(value), value.to_string());
                    }

                    let mut rng = StdRng::seed_from_u64(0);
                    for _ in 0..1_000 {
                        let value: $type = rng.gen();
                        assert_eq!(encode(value), value.to_string());
                    }
                }
            }
        };
    }
    impl_int_test!(i8);
    impl_int_test!(i16);
    impl_int_test!(i32);
    impl_int_test!(i64);
    impl_int_test!(isize);
    impl_int_test!(u8);
    impl_int_test!(u16);
    impl_int_test!(u32);
    impl_int_test!(u64);
    impl_int_test!(usize);

    #[test]
    fn test_every_digit_count() {
        let mut value = 1u64;
        for digits in 1..=19 {
            assert_eq!(encode(value).len(), digits);
            assert_eq!(encode(value - 1), (value - 1).to_string());
            assert_eq!(encode(-(value as i64)), format!("-{value}"));
            value *= 10;
        }
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(encode(-1i8), "-1");
        assert_eq!(encode(i8::MIN), "-128");
        assert_eq!(encode(u8::MAX), "255");
        assert_eq!(encode(i64::MIN), "-9223372036854775808");
        assert_eq!(encode(u64::MAX), "18446744073709551615");
        assert_eq!(encode(-0i32), "0");
    }

    #[test]
    fn test_appends() {
        let encoder = Int::<i32>::new();
        let mut buf = b"[".to_vec();
        encoder.encode(Context::none(), &mut buf, Addr::of(&-42i32));
        buf.put_u8(b',');
        encoder.encode(Context::none(), &mut buf, Addr::of(&7i32));
        assert_eq!(buf, b"[-42,7");
    }

    #[test]
    #[should_panic(expected = "value is not a u16")]
    fn test_wrong_type() {
        Int::<u16>::new().encode_to_bytes(Context::none(), Addr::of(&1u32));
    }
}
