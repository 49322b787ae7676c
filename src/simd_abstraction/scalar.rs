//! Portable engine: every operation is a loop over lanes.
//!
//! The vector types are plain lane arrays (`Lanes<T, N>`) with the same
//! memory layout as a 128-bit register. Arithmetic goes through the per-lane
//! algorithms in `super::lane`, which are written once for every lane width.

use super::lane::{self, Lane, LaneBits, SignedLane};
use super::{I32Lanes, IDENTITY_SHUFFLE, IntVector, Lanes32, SignedIntVector, SimdEngine};

/// `N` lanes of `T`, lane 0 at the lowest address.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(C, align(16))]
pub struct Lanes<T, const N: usize>(pub [T; N]);

#[allow(non_camel_case_types)]
pub type U8x16 = Lanes<u8, 16>;
#[allow(non_camel_case_types)]
pub type U16x8 = Lanes<u16, 8>;
#[allow(non_camel_case_types)]
pub type U32x4 = Lanes<u32, 4>;
#[allow(non_camel_case_types)]
pub type I8x16 = Lanes<i8, 16>;
#[allow(non_camel_case_types)]
pub type I16x8 = Lanes<i16, 8>;
#[allow(non_camel_case_types)]
pub type I32x4 = Lanes<i32, 4>;

impl<T: Lane, const N: usize> Default for Lanes<T, N> {
    fn default() -> Self {
        Self([T::default(); N])
    }
}

impl<T: Lane, const N: usize> Lanes<T, N> {
    #[inline(always)]
    fn unroll(self, f: impl Fn(T) -> T) -> Self {
        Self(self.0.map(f))
    }

    #[inline(always)]
    fn unroll2(self, other: Self, f: impl Fn(T, T) -> T) -> Self {
        let mut v = self.0;
        for (x, y) in v.iter_mut().zip(other.0) {
            *x = f(*x, y);
        }
        Self(v)
    }

    #[inline(always)]
    fn unroll_bits(self, other: Self, f: impl Fn(T::Bits, T::Bits) -> T::Bits) -> Self {
        self.unroll2(other, |a, b| T::from_bits(f(a.to_bits(), b.to_bits())))
    }
}

/// Portable 128-bit engine.
///
/// Serves as the reference implementation: the accelerated engine is tested
/// for bit-exact agreement with it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScalarEngine;

impl SimdEngine for ScalarEngine {
    const NAME: &'static str = "scalar";

    type U8x16 = U8x16;
    type U16x8 = U16x8;
    type U32x4 = U32x4;
    type I8x16 = I8x16;
    type I16x8 = I16x8;
    type I32x4 = I32x4;
}

impl<T: Lane, const N: usize> IntVector for Lanes<T, N>
where
    [T; N]: Default + AsRef<[T]> + AsMut<[T]>,
{
    type Scalar = T;
    type Array = [T; N];
    const LANES: usize = N;

    #[inline(always)]
    fn zero() -> Self {
        Self::default()
    }

    #[inline(always)]
    fn set1(s: T) -> Self {
        Self([s; N])
    }

    #[inline(always)]
    unsafe fn uload(src: *const T) -> Self {
        // SAFETY: the caller guarantees `N` readable scalars at `src`.
        Self(unsafe { (src as *const [T; N]).read_unaligned() })
    }

    #[inline(always)]
    unsafe fn ustore(self, dst: *mut T) {
        // SAFETY: the caller guarantees `N` writable scalars at `dst`.
        unsafe { (dst as *mut [T; N]).write_unaligned(self.0) }
    }

    #[inline(always)]
    fn from_array(lanes: [T; N]) -> Self {
        Self(lanes)
    }

    #[inline(always)]
    fn to_array(self) -> [T; N] {
        self.0
    }

    #[inline(always)]
    fn unpacklo(self, other: Self) -> Self {
        let mut v = self.0;
        for i in 0..N / 2 {
            v[i * 2] = self.0[i];
            v[i * 2 + 1] = other.0[i];
        }
        Self(v)
    }

    #[inline(always)]
    fn unpackhi(self, other: Self) -> Self {
        let half = N / 2;
        let mut v = self.0;
        for i in 0..half {
            v[i * 2] = self.0[i + half];
            v[i * 2 + 1] = other.0[i + half];
        }
        Self(v)
    }

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        self.unroll_bits(other, LaneBits::wrapping_add)
    }

    #[inline(always)]
    fn sub(self, other: Self) -> Self {
        self.unroll_bits(other, LaneBits::wrapping_sub)
    }

    #[inline(always)]
    fn mullo(self, other: Self) -> Self {
        self.unroll2(other, lane::mullo)
    }

    #[inline(always)]
    fn adds(self, other: Self) -> Self {
        self.unroll2(other, Lane::saturating_add_lane)
    }

    #[inline(always)]
    fn subs(self, other: Self) -> Self {
        self.unroll2(other, Lane::saturating_sub_lane)
    }

    #[inline(always)]
    fn and(self, other: Self) -> Self {
        self.unroll_bits(other, |a, b| a & b)
    }

    #[inline(always)]
    fn nand(self, other: Self) -> Self {
        self.unroll_bits(other, |a, b| !a & b)
    }

    #[inline(always)]
    fn or(self, other: Self) -> Self {
        self.unroll_bits(other, |a, b| a | b)
    }

    #[inline(always)]
    fn xor(self, other: Self) -> Self {
        self.unroll_bits(other, |a, b| a ^ b)
    }

    #[inline(always)]
    fn not(self) -> Self {
        self.unroll(|a| T::from_bits(!a.to_bits()))
    }

    #[inline(always)]
    fn compare_eq(self, other: Self) -> Self {
        self.unroll2(other, |a, b| lane::lane_mask(a == b))
    }

    #[inline(always)]
    fn compare_gt(self, other: Self) -> Self {
        self.unroll2(other, |a, b| lane::lane_mask(a > b))
    }

    #[inline(always)]
    fn select(mask: Self, a: Self, b: Self) -> Self {
        let mut v = b.0;
        for i in 0..N {
            v[i] = T::from_bits(lane::select_bits(
                mask.0[i].to_bits(),
                a.0[i].to_bits(),
                b.0[i].to_bits(),
            ));
        }
        Self(v)
    }

    #[inline(always)]
    fn min(self, other: Self) -> Self {
        self.unroll2(other, |a, b| if a > b { b } else { a })
    }

    #[inline(always)]
    fn max(self, other: Self) -> Self {
        self.unroll2(other, |a, b| if a > b { a } else { b })
    }
}

impl<T: Lane<Bits = u32>> Lanes32 for Lanes<T, 4> {
    #[inline(always)]
    fn set4(x: T, y: T, z: T, w: T) -> Self {
        Self([x, y, z, w])
    }

    #[inline(always)]
    fn shuffle<const MASK: i32>(self) -> Self {
        const { assert!(MASK >= 0 && MASK <= 0xff, "shuffle mask out of range") };
        if MASK == IDENTITY_SHUFFLE {
            return self;
        }
        let v = self.0;
        Self([
            v[(MASK & 3) as usize],
            v[((MASK >> 2) & 3) as usize],
            v[((MASK >> 4) & 3) as usize],
            v[((MASK >> 6) & 3) as usize],
        ])
    }

    #[inline(always)]
    fn get_component<const INDEX: i32>(self) -> T {
        const { assert!(INDEX >= 0 && INDEX < 4, "Index out of range.") };
        self.0[INDEX as usize]
    }

    #[inline(always)]
    fn set_component<const INDEX: i32>(self, s: T) -> Self {
        const { assert!(INDEX >= 0 && INDEX < 4, "Index out of range.") };
        let mut v = self.0;
        v[INDEX as usize] = s;
        Self(v)
    }

    #[inline(always)]
    fn sll<const COUNT: i32>(self) -> Self {
        self.unroll(|a| T::from_bits(a.to_bits().wrapping_shl(COUNT as u32)))
    }

    #[inline(always)]
    fn srl<const COUNT: i32>(self) -> Self {
        self.unroll(|a| T::from_bits(a.to_bits().wrapping_shr(COUNT as u32)))
    }
}

impl<T: SignedLane, const N: usize> SignedIntVector for Lanes<T, N>
where
    Self: IntVector,
{
    #[inline(always)]
    fn abs(self) -> Self {
        self.unroll(SignedLane::wrapping_abs_lane)
    }

    #[inline(always)]
    fn neg(self) -> Self {
        self.unroll(SignedLane::wrapping_neg_lane)
    }
}

impl I32Lanes for I32x4 {
    #[inline(always)]
    fn sra<const COUNT: i32>(self) -> Self {
        self.unroll(|a| a.shr_arith(COUNT as u32))
    }

    #[inline(always)]
    fn get_mask(self) -> u32 {
        self.0
            .iter()
            .enumerate()
            .fold(0, |mask, (i, &lane)| mask | (((lane as u32) >> 31) << i))
    }

    #[inline(always)]
    fn pack(self) -> u32 {
        let [x, y, z, w] = self.0.map(lane::byteclamp);
        x | (y << 8) | (z << 16) | (w << 24)
    }

    #[inline(always)]
    fn unpack(s: u32) -> Self {
        Self([
            (s & 0xff) as i32,
            ((s >> 8) & 0xff) as i32,
            ((s >> 16) & 0xff) as i32,
            (s >> 24) as i32,
        ])
    }
}
