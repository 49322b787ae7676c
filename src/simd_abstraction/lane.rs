//! Per-lane integer algorithms shared by every lane width.
//!
//! The portable engine is built entirely out of the functions in this module:
//! each vector operation loops over its lanes and applies one of them. The
//! saturating routines run in the unsigned domain of the lane (`Lane::Bits`)
//! so the exact same bit-level derivation serves 8-, 16- and 32-bit lanes.
//!
//! Signed saturation works as follows. With `x = a`, `y = b` reinterpreted as
//! unsigned and `v = x + y` (wrapping):
//!
//! - overflow happened iff `x ^ y` has the sign bit clear (operands share a
//!   sign) and `y ^ v` has the sign bit set (the result flipped it);
//! - the saturation bound is `(x >> (BITS - 1)) + MAX`, i.e. `MAX` for a
//!   non-negative `a` and `MAX + 1 == MIN` for a negative one.
//!
//! Subtraction is the mirror image: overflow iff `x ^ y` has the sign bit set
//! (operands differ in sign) and `x ^ v` has it set.

use core::fmt::Debug;
use core::ops::{BitAnd, BitOr, BitXor, Not, Shl, Shr};

/// Unsigned storage of one lane; the domain the saturation algorithms run in.
pub trait LaneBits:
    Copy
    + Eq
    + Ord
    + Debug
    + Default
    + From<bool>
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
    + Not<Output = Self>
    + Shl<u32, Output = Self>
    + Shr<u32, Output = Self>
{
    const BITS: u32;
    const ZERO: Self;

    fn wrapping_add(self, rhs: Self) -> Self;
    fn wrapping_sub(self, rhs: Self) -> Self;
    fn wrapping_mul(self, rhs: Self) -> Self;
    fn wrapping_shl(self, count: u32) -> Self;
    fn wrapping_shr(self, count: u32) -> Self;

    /// All-ones when `flag` is set, all-zeros otherwise.
    #[inline(always)]
    fn mask(flag: bool) -> Self {
        Self::ZERO.wrapping_sub(Self::from(flag))
    }

    #[inline(always)]
    fn sign_set(self) -> bool {
        (self >> (Self::BITS - 1)) != Self::ZERO
    }
}

/// A scalar lane type (`u8`, `u16`, `u32`, `i8`, `i16`, `i32`).
pub trait Lane: Copy + Default + PartialEq + PartialOrd + Debug + Send + Sync + 'static {
    type Bits: LaneBits;

    /// Bit pattern of the largest representable value.
    const MAX_BITS: Self::Bits;

    fn to_bits(self) -> Self::Bits;
    fn from_bits(bits: Self::Bits) -> Self;

    fn saturating_add_lane(self, rhs: Self) -> Self;
    fn saturating_sub_lane(self, rhs: Self) -> Self;
}

/// Lane types with a sign bit.
pub trait SignedLane: Lane {
    fn wrapping_abs_lane(self) -> Self;
    fn wrapping_neg_lane(self) -> Self;
    /// Sign-extending right shift.
    fn shr_arith(self, count: u32) -> Self;
}

/// `(mask & a) | (!mask & b)`
#[inline(always)]
pub fn select_bits<B: LaneBits>(mask: B, a: B, b: B) -> B {
    (mask & a) | (!mask & b)
}

/// Unsigned saturating add: a wrapped sum is smaller than `a`.
#[inline(always)]
pub fn unsigned_adds<B: LaneBits>(a: B, b: B) -> B {
    let v = a.wrapping_add(b);
    v | B::mask(v < a)
}

/// Unsigned saturating subtract: a wrapped difference is larger than `a`.
#[inline(always)]
pub fn unsigned_subs<B: LaneBits>(a: B, b: B) -> B {
    let v = a.wrapping_sub(b);
    v & B::mask(v <= a)
}

#[inline(always)]
fn saturation_bound<B: LaneBits>(a: B, max: B) -> B {
    (a >> (B::BITS - 1)).wrapping_add(max)
}

/// Signed saturating add on the two's complement bit patterns of `a` and `b`.
#[inline(always)]
pub fn signed_adds<B: LaneBits>(a: B, b: B, max: B) -> B {
    let v = a.wrapping_add(b);
    let overflow = !((a ^ b) | !(b ^ v)).sign_set();
    select_bits(B::mask(overflow), saturation_bound(a, max), v)
}

/// Signed saturating subtract on the two's complement bit patterns of `a` and `b`.
#[inline(always)]
pub fn signed_subs<B: LaneBits>(a: B, b: B, max: B) -> B {
    let v = a.wrapping_sub(b);
    let overflow = ((a ^ b) & (a ^ v)).sign_set();
    select_bits(B::mask(overflow), saturation_bound(a, max), v)
}

/// Low half of the product; identical for signed and unsigned lanes.
#[inline(always)]
pub fn mullo<T: Lane>(a: T, b: T) -> T {
    T::from_bits(a.to_bits().wrapping_mul(b.to_bits()))
}

/// All-ones or all-zeros lane.
#[inline(always)]
pub fn lane_mask<T: Lane>(flag: bool) -> T {
    T::from_bits(T::Bits::mask(flag))
}

/// Clamp a signed 32-bit value into `[0, 255]`.
#[inline(always)]
pub fn byteclamp(value: i32) -> u32 {
    value.clamp(0, 255) as u32
}

macro_rules! impl_lane_bits {
    ($($t:ty),*) => {
        $(
            impl LaneBits for $t {
                const BITS: u32 = <$t>::BITS;
                const ZERO: Self = 0;

                #[inline(always)]
                fn wrapping_add(self, rhs: Self) -> Self {
                    <$t>::wrapping_add(self, rhs)
                }

                #[inline(always)]
                fn wrapping_sub(self, rhs: Self) -> Self {
                    <$t>::wrapping_sub(self, rhs)
                }

                #[inline(always)]
                fn wrapping_mul(self, rhs: Self) -> Self {
                    <$t>::wrapping_mul(self, rhs)
                }

                #[inline(always)]
                fn wrapping_shl(self, count: u32) -> Self {
                    <$t>::wrapping_shl(self, count)
                }

                #[inline(always)]
                fn wrapping_shr(self, count: u32) -> Self {
                    <$t>::wrapping_shr(self, count)
                }
            }
        )*
    };
}

impl_lane_bits!(u8, u16, u32);

macro_rules! impl_unsigned_lane {
    ($($t:ty),*) => {
        $(
            impl Lane for $t {
                type Bits = $t;
                const MAX_BITS: $t = <$t>::MAX;

                #[inline(always)]
                fn to_bits(self) -> $t {
                    self
                }

                #[inline(always)]
                fn from_bits(bits: $t) -> Self {
                    bits
                }

                #[inline(always)]
                fn saturating_add_lane(self, rhs: Self) -> Self {
                    unsigned_adds(self, rhs)
                }

                #[inline(always)]
                fn saturating_sub_lane(self, rhs: Self) -> Self {
                    unsigned_subs(self, rhs)
                }
            }
        )*
    };
}

impl_unsigned_lane!(u8, u16, u32);

macro_rules! impl_signed_lane {
    ($($t:ty => $u:ty),*) => {
        $(
            impl Lane for $t {
                type Bits = $u;
                const MAX_BITS: $u = <$t>::MAX as $u;

                #[inline(always)]
                fn to_bits(self) -> $u {
                    self as $u
                }

                #[inline(always)]
                fn from_bits(bits: $u) -> Self {
                    bits as $t
                }

                #[inline(always)]
                fn saturating_add_lane(self, rhs: Self) -> Self {
                    Self::from_bits(signed_adds(self.to_bits(), rhs.to_bits(), Self::MAX_BITS))
                }

                #[inline(always)]
                fn saturating_sub_lane(self, rhs: Self) -> Self {
                    Self::from_bits(signed_subs(self.to_bits(), rhs.to_bits(), Self::MAX_BITS))
                }
            }

            impl SignedLane for $t {
                #[inline(always)]
                fn wrapping_abs_lane(self) -> Self {
                    <$t>::wrapping_abs(self)
                }

                #[inline(always)]
                fn wrapping_neg_lane(self) -> Self {
                    <$t>::wrapping_neg(self)
                }

                #[inline(always)]
                fn shr_arith(self, count: u32) -> Self {
                    <$t>::wrapping_shr(self, count)
                }
            }
        )*
    };
}

impl_signed_lane!(i8 => u8, i16 => u16, i32 => u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_adds_exhaustive_i8() {
        for a in i8::MIN..=i8::MAX {
            for b in i8::MIN..=i8::MAX {
                let expected = (a as i32 + b as i32).clamp(i8::MIN as i32, i8::MAX as i32) as i8;
                assert_eq!(a.saturating_add_lane(b), expected, "{a} + {b}");
            }
        }
    }

    #[test]
    fn test_signed_subs_exhaustive_i8() {
        for a in i8::MIN..=i8::MAX {
            for b in i8::MIN..=i8::MAX {
                let expected = (a as i32 - b as i32).clamp(i8::MIN as i32, i8::MAX as i32) as i8;
                assert_eq!(a.saturating_sub_lane(b), expected, "{a} - {b}");
            }
        }
    }

    #[test]
    fn test_unsigned_saturation_exhaustive_u8() {
        for a in 0..=u8::MAX {
            for b in 0..=u8::MAX {
                assert_eq!(a.saturating_add_lane(b), a.saturating_add(b));
                assert_eq!(a.saturating_sub_lane(b), a.saturating_sub(b));
            }
        }
    }

    #[test]
    fn test_wide_lane_edges() {
        assert_eq!(i16::MAX.saturating_add_lane(1), i16::MAX);
        assert_eq!(i16::MIN.saturating_sub_lane(1), i16::MIN);
        assert_eq!(i32::MIN.saturating_add_lane(-1), i32::MIN);
        assert_eq!(i32::MAX.saturating_sub_lane(-1), i32::MAX);
        assert_eq!((-5i32).saturating_sub_lane(i32::MAX), i32::MIN);
        assert_eq!(u32::MAX.saturating_add_lane(1), u32::MAX);
        assert_eq!(7u32.saturating_sub_lane(0), 7);
        assert_eq!(0u16.saturating_sub_lane(1), 0);
    }

    #[test]
    fn test_mullo_truncates() {
        assert_eq!(mullo(200u8, 3u8), (600u32 & 0xff) as u8);
        assert_eq!(mullo(-128i8, -1i8), -128);
        assert_eq!(mullo(0x1_0001u32, 0xffffu32), 0x1_0001u32.wrapping_mul(0xffff));
    }

    #[test]
    fn test_byteclamp() {
        assert_eq!(byteclamp(300), 255);
        assert_eq!(byteclamp(-10), 0);
        assert_eq!(byteclamp(77), 77);
    }
}
