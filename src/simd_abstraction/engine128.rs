//! 128-bit SSE engine (x86_64).
//!
//! Every vector type wraps one `__m128i`. SSE2 is the floor; where SSSE3 or
//! SSE4.1 has a direct instruction and the crate was built with that target
//! feature, the direct form is used. The choice is a branch on a constant
//! (`crate::simd::SSE_CAPABILITY`) and disappears after constant folding.
//! Fallback sequences live in `portable_intrinsics`.

#![allow(unused_unsafe)]

use core::fmt;

use super::portable_intrinsics as emu;
use super::types::{__m128i, VECTOR_BYTES, simd_arch};
use super::{I32Lanes, IDENTITY_SHUFFLE, IntVector, Lanes32, SignedIntVector, SimdEngine};
use crate::simd::SSE_CAPABILITY;

const _: () = assert!(core::mem::size_of::<__m128i>() == VECTOR_BYTES);

/// SSE-accelerated 128-bit engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimdEngine128;

impl SimdEngine for SimdEngine128 {
    const NAME: &'static str = "sse";

    type U8x16 = U8x16;
    type U16x8 = U16x8;
    type U32x4 = U32x4;
    type I8x16 = I8x16;
    type I16x8 = I16x8;
    type I32x4 = I32x4;
}

macro_rules! sse_vector {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy)]
        #[repr(transparent)]
        pub struct $name(pub __m128i);

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                <Self as IntVector>::zero()
            }
        }

        impl PartialEq for $name {
            #[inline]
            fn eq(&self, other: &Self) -> bool {
                // SAFETY: SSE2 is part of the x86_64 baseline.
                unsafe {
                    let eq = simd_arch::_mm_cmpeq_epi8(self.0, other.0);
                    simd_arch::_mm_movemask_epi8(eq) == 0xffff
                }
            }
        }

        impl Eq for $name {}

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.to_array()).finish()
            }
        }
    };
}

sse_vector!(
    /// Sixteen `u8` lanes.
    U8x16
);
sse_vector!(
    /// Eight `u16` lanes.
    U16x8
);
sse_vector!(
    /// Four `u32` lanes.
    U32x4
);
sse_vector!(
    /// Sixteen `i8` lanes.
    I8x16
);
sse_vector!(
    /// Eight `i16` lanes.
    I16x8
);
sse_vector!(
    /// Four `i32` lanes.
    I32x4
);

/// Items identical for every lane shape: memory access and the bitwise group.
macro_rules! common_ops {
    () => {
        #[inline(always)]
        fn zero() -> Self {
            Self(unsafe { simd_arch::_mm_setzero_si128() })
        }

        #[inline(always)]
        unsafe fn uload(src: *const Self::Scalar) -> Self {
            // SAFETY: the caller guarantees 16 readable bytes at `src`.
            Self(unsafe { simd_arch::_mm_loadu_si128(src as *const __m128i) })
        }

        #[inline(always)]
        unsafe fn ustore(self, dst: *mut Self::Scalar) {
            // SAFETY: the caller guarantees 16 writable bytes at `dst`.
            unsafe { simd_arch::_mm_storeu_si128(dst as *mut __m128i, self.0) }
        }

        #[inline(always)]
        fn and(self, other: Self) -> Self {
            Self(unsafe { simd_arch::_mm_and_si128(self.0, other.0) })
        }

        #[inline(always)]
        fn nand(self, other: Self) -> Self {
            Self(unsafe { simd_arch::_mm_andnot_si128(self.0, other.0) })
        }

        #[inline(always)]
        fn or(self, other: Self) -> Self {
            Self(unsafe { simd_arch::_mm_or_si128(self.0, other.0) })
        }

        #[inline(always)]
        fn xor(self, other: Self) -> Self {
            Self(unsafe { simd_arch::_mm_xor_si128(self.0, other.0) })
        }

        #[inline(always)]
        fn not(self) -> Self {
            Self(unsafe { emu::_mm_not_si128(self.0) })
        }

        #[inline(always)]
        fn select(mask: Self, a: Self, b: Self) -> Self {
            if SSE_CAPABILITY.has_sse41() {
                Self(unsafe { simd_arch::_mm_blendv_epi8(b.0, a.0, mask.0) })
            } else {
                Self(unsafe { emu::_mm_select_si128(mask.0, a.0, b.0) })
            }
        }
    };
}

/// Binary operation that maps straight onto one intrinsic.
macro_rules! direct {
    ($fn:ident => $intr:path) => {
        #[inline(always)]
        fn $fn(self, other: Self) -> Self {
            Self(unsafe { $intr(self.0, other.0) })
        }
    };
}

/// Binary operation with an SSE4.1 instruction and an SSE2 fallback.
macro_rules! sse41_or {
    ($fn:ident => $intr:path, $fallback:path) => {
        #[inline(always)]
        fn $fn(self, other: Self) -> Self {
            if SSE_CAPABILITY.has_sse41() {
                Self(unsafe { $intr(self.0, other.0) })
            } else {
                Self(unsafe { $fallback(self.0, other.0) })
            }
        }
    };
}

// ===== 8-bit lanes =====

impl IntVector for U8x16 {
    type Scalar = u8;
    type Array = [u8; 16];
    const LANES: usize = 16;

    common_ops!();

    #[inline(always)]
    fn set1(s: u8) -> Self {
        Self(unsafe { simd_arch::_mm_set1_epi8(s as i8) })
    }

    direct!(unpacklo => simd_arch::_mm_unpacklo_epi8);
    direct!(unpackhi => simd_arch::_mm_unpackhi_epi8);
    direct!(add => simd_arch::_mm_add_epi8);
    direct!(sub => simd_arch::_mm_sub_epi8);
    direct!(mullo => emu::_mm_mullo_epi8_emu);
    direct!(adds => simd_arch::_mm_adds_epu8);
    direct!(subs => simd_arch::_mm_subs_epu8);
    direct!(compare_eq => simd_arch::_mm_cmpeq_epi8);
    direct!(compare_gt => emu::_mm_cmpgt_epu8);
    direct!(min => simd_arch::_mm_min_epu8);
    direct!(max => simd_arch::_mm_max_epu8);
}

impl IntVector for I8x16 {
    type Scalar = i8;
    type Array = [i8; 16];
    const LANES: usize = 16;

    common_ops!();

    #[inline(always)]
    fn set1(s: i8) -> Self {
        Self(unsafe { simd_arch::_mm_set1_epi8(s) })
    }

    direct!(unpacklo => simd_arch::_mm_unpacklo_epi8);
    direct!(unpackhi => simd_arch::_mm_unpackhi_epi8);
    direct!(add => simd_arch::_mm_add_epi8);
    direct!(sub => simd_arch::_mm_sub_epi8);
    direct!(mullo => emu::_mm_mullo_epi8_emu);
    direct!(adds => simd_arch::_mm_adds_epi8);
    direct!(subs => simd_arch::_mm_subs_epi8);
    direct!(compare_eq => simd_arch::_mm_cmpeq_epi8);
    direct!(compare_gt => simd_arch::_mm_cmpgt_epi8);
    sse41_or!(min => simd_arch::_mm_min_epi8, emu::_mm_min_epi8_emu);
    sse41_or!(max => simd_arch::_mm_max_epi8, emu::_mm_max_epi8_emu);
}

impl SignedIntVector for I8x16 {
    #[inline(always)]
    fn abs(self) -> Self {
        if SSE_CAPABILITY.has_ssse3() {
            Self(unsafe { simd_arch::_mm_abs_epi8(self.0) })
        } else {
            Self(unsafe { emu::_mm_abs_epi8_emu(self.0) })
        }
    }

    #[inline(always)]
    fn neg(self) -> Self {
        Self::zero().sub(self)
    }
}

// ===== 16-bit lanes =====

impl IntVector for U16x8 {
    type Scalar = u16;
    type Array = [u16; 8];
    const LANES: usize = 8;

    common_ops!();

    #[inline(always)]
    fn set1(s: u16) -> Self {
        Self(unsafe { simd_arch::_mm_set1_epi16(s as i16) })
    }

    direct!(unpacklo => simd_arch::_mm_unpacklo_epi16);
    direct!(unpackhi => simd_arch::_mm_unpackhi_epi16);
    direct!(add => simd_arch::_mm_add_epi16);
    direct!(sub => simd_arch::_mm_sub_epi16);
    direct!(mullo => simd_arch::_mm_mullo_epi16);
    direct!(adds => simd_arch::_mm_adds_epu16);
    direct!(subs => simd_arch::_mm_subs_epu16);
    direct!(compare_eq => simd_arch::_mm_cmpeq_epi16);
    direct!(compare_gt => emu::_mm_cmpgt_epu16);
    sse41_or!(min => simd_arch::_mm_min_epu16, emu::_mm_min_epu16_emu);
    sse41_or!(max => simd_arch::_mm_max_epu16, emu::_mm_max_epu16_emu);
}

impl IntVector for I16x8 {
    type Scalar = i16;
    type Array = [i16; 8];
    const LANES: usize = 8;

    common_ops!();

    #[inline(always)]
    fn set1(s: i16) -> Self {
        Self(unsafe { simd_arch::_mm_set1_epi16(s) })
    }

    direct!(unpacklo => simd_arch::_mm_unpacklo_epi16);
    direct!(unpackhi => simd_arch::_mm_unpackhi_epi16);
    direct!(add => simd_arch::_mm_add_epi16);
    direct!(sub => simd_arch::_mm_sub_epi16);
    direct!(mullo => simd_arch::_mm_mullo_epi16);
    direct!(adds => simd_arch::_mm_adds_epi16);
    direct!(subs => simd_arch::_mm_subs_epi16);
    direct!(compare_eq => simd_arch::_mm_cmpeq_epi16);
    direct!(compare_gt => simd_arch::_mm_cmpgt_epi16);
    direct!(min => simd_arch::_mm_min_epi16);
    direct!(max => simd_arch::_mm_max_epi16);
}

impl SignedIntVector for I16x8 {
    #[inline(always)]
    fn abs(self) -> Self {
        if SSE_CAPABILITY.has_ssse3() {
            Self(unsafe { simd_arch::_mm_abs_epi16(self.0) })
        } else {
            Self(unsafe { emu::_mm_abs_epi16_emu(self.0) })
        }
    }

    #[inline(always)]
    fn neg(self) -> Self {
        Self::zero().sub(self)
    }
}

// ===== 32-bit lanes =====

impl IntVector for U32x4 {
    type Scalar = u32;
    type Array = [u32; 4];
    const LANES: usize = 4;

    common_ops!();

    #[inline(always)]
    fn set1(s: u32) -> Self {
        Self(unsafe { simd_arch::_mm_set1_epi32(s as i32) })
    }

    direct!(unpacklo => simd_arch::_mm_unpacklo_epi32);
    direct!(unpackhi => simd_arch::_mm_unpackhi_epi32);
    direct!(add => simd_arch::_mm_add_epi32);
    direct!(sub => simd_arch::_mm_sub_epi32);
    sse41_or!(mullo => simd_arch::_mm_mullo_epi32, emu::_mm_mullo_epi32_emu);
    direct!(adds => emu::_mm_adds_epu32_emu);
    direct!(subs => emu::_mm_subs_epu32_emu);
    direct!(compare_eq => simd_arch::_mm_cmpeq_epi32);
    direct!(compare_gt => emu::_mm_cmpgt_epu32);
    sse41_or!(min => simd_arch::_mm_min_epu32, emu::_mm_min_epu32_emu);
    sse41_or!(max => simd_arch::_mm_max_epu32, emu::_mm_max_epu32_emu);
}

impl IntVector for I32x4 {
    type Scalar = i32;
    type Array = [i32; 4];
    const LANES: usize = 4;

    common_ops!();

    #[inline(always)]
    fn set1(s: i32) -> Self {
        Self(unsafe { simd_arch::_mm_set1_epi32(s) })
    }

    direct!(unpacklo => simd_arch::_mm_unpacklo_epi32);
    direct!(unpackhi => simd_arch::_mm_unpackhi_epi32);
    direct!(add => simd_arch::_mm_add_epi32);
    direct!(sub => simd_arch::_mm_sub_epi32);
    sse41_or!(mullo => simd_arch::_mm_mullo_epi32, emu::_mm_mullo_epi32_emu);
    direct!(adds => emu::_mm_adds_epi32_emu);
    direct!(subs => emu::_mm_subs_epi32_emu);
    direct!(compare_eq => simd_arch::_mm_cmpeq_epi32);
    direct!(compare_gt => simd_arch::_mm_cmpgt_epi32);
    sse41_or!(min => simd_arch::_mm_min_epi32, emu::_mm_min_epi32_emu);
    sse41_or!(max => simd_arch::_mm_max_epi32, emu::_mm_max_epi32_emu);
}

macro_rules! impl_lanes32 {
    ($name:ident, $scalar:ty) => {
        impl Lanes32 for $name {
            #[inline(always)]
            fn set4(x: $scalar, y: $scalar, z: $scalar, w: $scalar) -> Self {
                Self(unsafe { simd_arch::_mm_setr_epi32(x as i32, y as i32, z as i32, w as i32) })
            }

            #[inline(always)]
            fn shuffle<const MASK: i32>(self) -> Self {
                const { assert!(MASK >= 0 && MASK <= 0xff, "shuffle mask out of range") };
                if MASK == IDENTITY_SHUFFLE {
                    return self;
                }
                Self(unsafe { simd_arch::_mm_shuffle_epi32::<MASK>(self.0) })
            }

            #[inline(always)]
            fn get_component<const INDEX: i32>(self) -> $scalar {
                const { assert!(INDEX >= 0 && INDEX < 4, "Index out of range.") };
                if SSE_CAPABILITY.has_sse41() {
                    (unsafe { simd_arch::_mm_extract_epi32::<INDEX>(self.0) }) as $scalar
                } else {
                    (unsafe { emu::_mm_extract_epi32_emu::<INDEX>(self.0) }) as $scalar
                }
            }

            #[inline(always)]
            fn set_component<const INDEX: i32>(self, s: $scalar) -> Self {
                const { assert!(INDEX >= 0 && INDEX < 4, "Index out of range.") };
                if SSE_CAPABILITY.has_sse41() {
                    Self(unsafe { simd_arch::_mm_insert_epi32::<INDEX>(self.0, s as i32) })
                } else {
                    Self(unsafe { emu::_mm_insert_epi32_emu::<INDEX>(self.0, s as i32) })
                }
            }

            #[inline(always)]
            fn sll<const COUNT: i32>(self) -> Self {
                Self(unsafe { simd_arch::_mm_slli_epi32::<COUNT>(self.0) })
            }

            #[inline(always)]
            fn srl<const COUNT: i32>(self) -> Self {
                Self(unsafe { simd_arch::_mm_srli_epi32::<COUNT>(self.0) })
            }
        }
    };
}

impl_lanes32!(U32x4, u32);
impl_lanes32!(I32x4, i32);

impl SignedIntVector for I32x4 {
    #[inline(always)]
    fn abs(self) -> Self {
        if SSE_CAPABILITY.has_ssse3() {
            Self(unsafe { simd_arch::_mm_abs_epi32(self.0) })
        } else {
            Self(unsafe { emu::_mm_abs_epi32_emu(self.0) })
        }
    }

    #[inline(always)]
    fn neg(self) -> Self {
        Self::zero().sub(self)
    }
}

impl I32Lanes for I32x4 {
    #[inline(always)]
    fn sra<const COUNT: i32>(self) -> Self {
        Self(unsafe { simd_arch::_mm_srai_epi32::<COUNT>(self.0) })
    }

    #[inline(always)]
    fn get_mask(self) -> u32 {
        (unsafe { simd_arch::_mm_movemask_ps(simd_arch::_mm_castsi128_ps(self.0)) }) as u32
    }

    #[inline(always)]
    fn pack(self) -> u32 {
        unsafe { emu::_mm_pack_epi32_u8(self.0) }
    }

    #[inline(always)]
    fn unpack(s: u32) -> Self {
        let bytes = unsafe { simd_arch::_mm_cvtsi32_si128(s as i32) };
        if SSE_CAPABILITY.has_sse41() {
            Self(unsafe { simd_arch::_mm_cvtepu8_epi32(bytes) })
        } else {
            Self(unsafe { emu::_mm_cvtepu8_epi32_emu(bytes) })
        }
    }
}
