//! An abstraction layer for 128-bit integer SIMD operations.
//!
//! This module defines one operation catalogue over six 128-bit integer
//! vector shapes and provides two interchangeable engines implementing it:
//!
//! - `ScalarEngine`: portable, loops over lanes with native integer arithmetic
//! - `SimdEngine128`: SSE on x86_64 (SSE2 baseline, SSSE3 / SSE4.1 variants)
//!
//! ## Engine Architecture
//!
//! The `SimdEngine` trait names the vector types of an engine through
//! associated types. Generic code takes an engine type parameter and never
//! pays for dispatch:
//!
//! ```
//! use lane128::simd_abstraction::{IntVector, ScalarEngine, SimdEngine};
//!
//! fn brighten<E: SimdEngine>(pixels: E::U8x16, amount: u8) -> E::U8x16 {
//!     pixels.adds(E::U8x16::set1(amount))
//! }
//!
//! let v = <ScalarEngine as SimdEngine>::U8x16::set1(250);
//! assert_eq!(brighten::<ScalarEngine>(v, 10).to_array(), [255u8; 16]);
//! ```
//!
//! ## Build-Time Selection
//!
//! `NativeEngine` is fixed when the crate is compiled: `SimdEngine128` on
//! x86_64, `ScalarEngine` on other targets or with the `force-scalar`
//! feature. Inside `SimdEngine128`, alternative instruction sequences are
//! picked by `crate::simd::SSE_CAPABILITY`, a constant derived from the
//! enabled target features (`-C target-cpu=...`) that `force-scalar` does not
//! lower. Both choices fold away at compile time.
//!
//! ## Equivalence Contract
//!
//! For every operation and every valid input, both engines produce the same
//! bits. The only exceptions are inputs the operation declares as caller
//! preconditions:
//!
//! - shift counts of 32 or more (SSE yields zero / sign fill, the portable
//!   engine wraps the count modulo the lane width),
//! - `select` masks whose lanes are not all-zeros or all-ones.

pub mod lane;
pub mod scalar;
pub mod types;

#[cfg(target_arch = "x86_64")]
pub mod engine128;
#[cfg(target_arch = "x86_64")]
pub mod portable_intrinsics;


use core::fmt::Debug;

pub use scalar::ScalarEngine;

#[cfg(target_arch = "x86_64")]
pub use engine128::SimdEngine128;

/// The engine selected for this build.
#[cfg(all(target_arch = "x86_64", not(feature = "force-scalar")))]
pub type NativeEngine = SimdEngine128;

/// The engine selected for this build.
#[cfg(any(not(target_arch = "x86_64"), feature = "force-scalar"))]
pub type NativeEngine = ScalarEngine;

/// Operations available on every 128-bit integer vector shape.
///
/// Masks returned by the `compare_*` family have the operand's own type, so a
/// mask can only ever be fed back into `select` of the same shape.
pub trait IntVector: Copy + Clone + Debug + Default + PartialEq + Send + Sync + 'static {
    /// Lane scalar type.
    type Scalar: Copy + Debug + PartialEq + Send + Sync + 'static;

    /// Lane array with the same layout as the vector in memory.
    type Array: Copy
        + Debug
        + Default
        + PartialEq
        + AsRef<[Self::Scalar]>
        + AsMut<[Self::Scalar]>
        + Send
        + Sync
        + 'static;

    /// Number of lanes (16, 8 or 4).
    const LANES: usize;

    // ===== Creation and Initialization =====

    /// All lanes zero.
    fn zero() -> Self;

    /// All lanes set to `s`.
    fn set1(s: Self::Scalar) -> Self;

    // ===== Memory Operations =====

    /// Load `LANES` scalars from unaligned memory.
    ///
    /// # Safety
    ///
    /// `src` must be valid for reading `LANES` consecutive scalars. No
    /// alignment is required.
    unsafe fn uload(src: *const Self::Scalar) -> Self;

    /// Store `LANES` scalars to unaligned memory.
    ///
    /// # Safety
    ///
    /// `dst` must be valid for writing `LANES` consecutive scalars. No
    /// alignment is required.
    unsafe fn ustore(self, dst: *mut Self::Scalar);

    #[inline(always)]
    fn from_array(lanes: Self::Array) -> Self {
        // SAFETY: `Array` holds exactly `LANES` scalars.
        unsafe { Self::uload(lanes.as_ref().as_ptr()) }
    }

    #[inline(always)]
    fn to_array(self) -> Self::Array {
        let mut out = Self::Array::default();
        // SAFETY: `Array` holds exactly `LANES` scalars.
        unsafe { self.ustore(out.as_mut().as_mut_ptr()) };
        out
    }

    // ===== Interleave =====

    /// `[a0, b0, a1, b1, ...]` from the lower halves of `self` and `other`.
    fn unpacklo(self, other: Self) -> Self;

    /// `[a(n/2), b(n/2), ...]` from the upper halves of `self` and `other`.
    fn unpackhi(self, other: Self) -> Self;

    // ===== Arithmetic =====

    /// Wrapping add.
    fn add(self, other: Self) -> Self;

    /// Wrapping subtract.
    fn sub(self, other: Self) -> Self;

    /// Low half of the lane-wise product.
    fn mullo(self, other: Self) -> Self;

    /// Saturating add.
    fn adds(self, other: Self) -> Self;

    /// Saturating subtract.
    fn subs(self, other: Self) -> Self;

    // ===== Bitwise Operations =====

    fn and(self, other: Self) -> Self;

    /// `!self & other`. Note the operand order: this is not `!(self & other)`.
    fn nand(self, other: Self) -> Self;

    fn or(self, other: Self) -> Self;

    fn xor(self, other: Self) -> Self;

    #[inline(always)]
    fn not(self) -> Self {
        self.xor(self.compare_eq(self))
    }

    // ===== Comparison Operations =====

    fn compare_eq(self, other: Self) -> Self;

    /// Greater-than in the lane's own signedness.
    fn compare_gt(self, other: Self) -> Self;

    #[inline(always)]
    fn compare_neq(self, other: Self) -> Self {
        self.compare_eq(other).not()
    }

    #[inline(always)]
    fn compare_lt(self, other: Self) -> Self {
        other.compare_gt(self)
    }

    #[inline(always)]
    fn compare_le(self, other: Self) -> Self {
        self.compare_gt(other).not()
    }

    #[inline(always)]
    fn compare_ge(self, other: Self) -> Self {
        other.compare_gt(self).not()
    }

    // ===== Blend/Select Operations =====

    /// Lanes of `a` where `mask` is all-ones, lanes of `b` where it is zero.
    ///
    /// Every mask lane must be all-ones or all-zeros; anything else gives an
    /// engine-specific result.
    fn select(mask: Self, a: Self, b: Self) -> Self;

    fn min(self, other: Self) -> Self;

    fn max(self, other: Self) -> Self;
}

/// Operations only offered on 32-bit lanes (`U32x4`, `I32x4`).
pub trait Lanes32: IntVector {
    fn set4(x: Self::Scalar, y: Self::Scalar, z: Self::Scalar, w: Self::Scalar) -> Self;

    /// `{v[x], v[y], v[z], v[w]}` for `MASK == shuffle_mask(x, y, z, w)`.
    ///
    /// Prefer the `shuffle!` macro, which computes and range-checks the mask
    /// at compile time.
    fn shuffle<const MASK: i32>(self) -> Self;

    /// Lane `INDEX`; `INDEX >= 4` fails to compile.
    ///
    /// ```
    /// use lane128::simd_abstraction::{Lanes32, native::I32x4};
    /// let v = I32x4::set4(7, 8, 9, 10);
    /// assert_eq!(v.get_component::<3>(), 10);
    /// ```
    ///
    /// ```compile_fail
    /// use lane128::simd_abstraction::{Lanes32, native::I32x4};
    /// let v = I32x4::set4(7, 8, 9, 10);
    /// let _ = v.get_component::<4>();
    /// ```
    fn get_component<const INDEX: i32>(self) -> Self::Scalar;

    /// Copy of `self` with lane `INDEX` replaced; `INDEX >= 4` fails to compile.
    ///
    /// ```compile_fail
    /// use lane128::simd_abstraction::{Lanes32, native::U32x4};
    /// let _ = U32x4::set4(1, 2, 3, 4).set_component::<4>(0);
    /// ```
    fn set_component<const INDEX: i32>(self, s: Self::Scalar) -> Self;

    /// Logical left shift by `COUNT` (must be below 32).
    fn sll<const COUNT: i32>(self) -> Self;

    /// Logical right shift by `COUNT` (must be below 32).
    fn srl<const COUNT: i32>(self) -> Self;
}

/// Operations only offered on signed lanes.
pub trait SignedIntVector: IntVector {
    /// Wrapping absolute value: `abs(MIN) == MIN`.
    fn abs(self) -> Self;

    /// Wrapping negation.
    fn neg(self) -> Self;
}

/// Operations only offered on `I32x4`.
pub trait I32Lanes: Lanes32<Scalar = i32> {
    /// Arithmetic (sign-extending) right shift by `COUNT` (must be below 32).
    fn sra<const COUNT: i32>(self) -> Self;

    /// Bit `i` is the sign bit of lane `i`.
    fn get_mask(self) -> u32;

    /// Clamp each lane into `[0, 255]` and pack lane `i` into byte `i`.
    fn pack(self) -> u32;

    /// Inverse of `pack`: byte `i` zero-extended into lane `i`.
    fn unpack(s: u32) -> Self;
}

/// Trait abstracting over the two 128-bit engines.
///
/// An engine is a zero-sized marker type; all of its functionality lives on
/// the associated vector types.
pub trait SimdEngine: Copy + Clone + Debug + Default + Send + Sync + 'static {
    /// Human-readable engine name.
    const NAME: &'static str;

    type U8x16: IntVector<Scalar = u8, Array = [u8; 16]>;
    type U16x8: IntVector<Scalar = u16, Array = [u16; 8]>;
    type U32x4: IntVector<Scalar = u32, Array = [u32; 4]> + Lanes32;
    type I8x16: IntVector<Scalar = i8, Array = [i8; 16]> + SignedIntVector;
    type I16x8: IntVector<Scalar = i16, Array = [i16; 8]> + SignedIntVector;
    type I32x4: IntVector<Scalar = i32, Array = [i32; 4]> + SignedIntVector + I32Lanes;
}

/// Encode a 32-bit lane permutation `{v[x], v[y], v[z], v[w]}`.
///
/// Panics (a compile error in const context) when an index is 4 or more.
pub const fn shuffle_mask(x: u32, y: u32, z: u32, w: u32) -> i32 {
    assert!(x < 4 && y < 4 && z < 4 && w < 4, "shuffle index out of range");
    ((w << 6) | (z << 4) | (y << 2) | x) as i32
}

/// `shuffle_mask(0, 1, 2, 3)`: returns the vector unchanged.
pub const IDENTITY_SHUFFLE: i32 = shuffle_mask(0, 1, 2, 3);

/// Permute the lanes of a 32-bit vector with compile-time indices.
///
/// `shuffle!(v, x, y, z, w)` evaluates to `{v[x], v[y], v[z], v[w]}`.
/// Out-of-range indices are rejected at compile time.
///
/// ```
/// use lane128::simd_abstraction::{IntVector, Lanes32, native::U32x4};
/// let v = U32x4::set4(10, 20, 30, 40);
/// assert_eq!(lane128::shuffle!(v, 3, 2, 1, 0).to_array(), [40, 30, 20, 10]);
/// ```
///
/// ```compile_fail
/// use lane128::simd_abstraction::{Lanes32, native::U32x4};
/// let v = U32x4::set4(10, 20, 30, 40);
/// let _ = lane128::shuffle!(v, 0, 1, 2, 4);
/// ```
#[macro_export]
macro_rules! shuffle {
    ($v:expr, $x:expr, $y:expr, $z:expr, $w:expr) => {
        $crate::simd_abstraction::Lanes32::shuffle::<
            { $crate::simd_abstraction::shuffle_mask($x, $y, $z, $w) },
        >($v)
    };
}

/// Vector types of `NativeEngine`.
pub mod native {
    use super::{NativeEngine, SimdEngine};

    pub type U8x16 = <NativeEngine as SimdEngine>::U8x16;
    pub type U16x8 = <NativeEngine as SimdEngine>::U16x8;
    pub type U32x4 = <NativeEngine as SimdEngine>::U32x4;
    pub type I8x16 = <NativeEngine as SimdEngine>::I8x16;
    pub type I16x8 = <NativeEngine as SimdEngine>::I16x8;
    pub type I32x4 = <NativeEngine as SimdEngine>::I32x4;
}
