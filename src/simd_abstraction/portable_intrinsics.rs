//! SSE2 emulation sequences for operations without a direct instruction
//!
//! The 128-bit engine uses a direct instruction whenever the build capability
//! offers one (SSSE3 `pabs*`, SSE4.1 `pmulld` / `pminu*` / `pextrd` / ...) and
//! falls back to the sequences in this module otherwise. Every helper here
//! produces exactly the bits of the direct form, and of the portable engine.
//!
//! Design notes
//! - All functions are `unsafe` for the same reasons as the underlying
//!   intrinsics; they only require SSE2, which every x86_64 CPU has.
//! - They are public so tests and benchmarks can exercise the fallback paths
//!   even on a build where the engine itself picks the direct instruction.
//! - Unsigned ordering is obtained from the signed compare by flipping the
//!   top bit of both operands, which maps `[0, 2^n)` monotonically onto
//!   `[-2^(n-1), 2^(n-1))`.

#![allow(unused_unsafe)]

use super::types::{__m128i, simd_arch};

/// `shufps` / `pshufd` immediate selecting lanes `w, x, y, z` (low to high).
///
/// Argument order follows the C `_MM_SHUFFLE` macro, whose Rust counterpart
/// is not usable as a const fn on stable.
pub(crate) const fn mm_shuffle(z: u32, y: u32, x: u32, w: u32) -> i32 {
    ((z << 6) | (y << 4) | (x << 2) | w) as i32
}

/// `mask ? a : b` per bit.
#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn _mm_select_si128(mask: __m128i, a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        simd_arch::_mm_or_si128(
            simd_arch::_mm_and_si128(mask, a),
            simd_arch::_mm_andnot_si128(mask, b),
        )
    }
}

/// `a ^ !0`
#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn _mm_not_si128(a: __m128i) -> __m128i {
    unsafe { simd_arch::_mm_xor_si128(a, simd_arch::_mm_cmpeq_epi32(a, a)) }
}

// ===== Unsigned compare =====

#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn _mm_cmpgt_epu8(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let sign = simd_arch::_mm_set1_epi8(0x80u8 as i8);
        simd_arch::_mm_cmpgt_epi8(simd_arch::_mm_xor_si128(a, sign), simd_arch::_mm_xor_si128(b, sign))
    }
}

#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn _mm_cmpgt_epu16(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let sign = simd_arch::_mm_set1_epi16(0x8000u16 as i16);
        simd_arch::_mm_cmpgt_epi16(simd_arch::_mm_xor_si128(a, sign), simd_arch::_mm_xor_si128(b, sign))
    }
}

#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn _mm_cmpgt_epu32(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let sign = simd_arch::_mm_set1_epi32(0x8000_0000u32 as i32);
        simd_arch::_mm_cmpgt_epi32(simd_arch::_mm_xor_si128(a, sign), simd_arch::_mm_xor_si128(b, sign))
    }
}

// ===== Multiply =====

/// 8-bit low multiply from two 16-bit multiplies.
///
/// The low byte of each 16-bit product only depends on the low bytes of its
/// operands, so one `pmullw` yields the even lanes; the odd lanes are moved
/// down by 8 bits, multiplied, and moved back up.
#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn _mm_mullo_epi8_emu(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let even = simd_arch::_mm_mullo_epi16(a, b);
        let odd = simd_arch::_mm_mullo_epi16(
            simd_arch::_mm_srli_epi16::<8>(a),
            simd_arch::_mm_srli_epi16::<8>(b),
        );
        simd_arch::_mm_or_si128(
            simd_arch::_mm_slli_epi16::<8>(odd),
            simd_arch::_mm_srli_epi16::<8>(simd_arch::_mm_slli_epi16::<8>(even)),
        )
    }
}

/// 32-bit low multiply from two `pmuludq` widening multiplies.
///
/// `pmuludq` multiplies lanes 0 and 2 into 64-bit products; shifting both
/// operands down by one lane covers lanes 1 and 3. The low halves of the four
/// products are then gathered and re-interleaved.
#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn _mm_mullo_epi32_emu(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let even = simd_arch::_mm_mul_epu32(a, b);
        let odd = simd_arch::_mm_mul_epu32(
            simd_arch::_mm_srli_si128::<4>(a),
            simd_arch::_mm_srli_si128::<4>(b),
        );
        let even = simd_arch::_mm_shuffle_epi32::<{ mm_shuffle(0, 0, 2, 0) }>(even);
        let odd = simd_arch::_mm_shuffle_epi32::<{ mm_shuffle(0, 0, 2, 0) }>(odd);
        simd_arch::_mm_unpacklo_epi32(even, odd)
    }
}

// ===== Min / Max =====

macro_rules! select_min_max {
    ($min:ident, $max:ident, $cmpgt:path) => {
        #[inline(always)]
        #[allow(unsafe_op_in_unsafe_fn)]
        pub unsafe fn $min(a: __m128i, b: __m128i) -> __m128i {
            unsafe { _mm_select_si128($cmpgt(a, b), b, a) }
        }

        #[inline(always)]
        #[allow(unsafe_op_in_unsafe_fn)]
        pub unsafe fn $max(a: __m128i, b: __m128i) -> __m128i {
            unsafe { _mm_select_si128($cmpgt(a, b), a, b) }
        }
    };
}

select_min_max!(_mm_min_epi8_emu, _mm_max_epi8_emu, simd_arch::_mm_cmpgt_epi8);
select_min_max!(_mm_min_epu16_emu, _mm_max_epu16_emu, _mm_cmpgt_epu16);
select_min_max!(_mm_min_epi32_emu, _mm_max_epi32_emu, simd_arch::_mm_cmpgt_epi32);
select_min_max!(_mm_min_epu32_emu, _mm_max_epu32_emu, _mm_cmpgt_epu32);

// ===== Absolute value =====

#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn _mm_abs_epi8_emu(a: __m128i) -> __m128i {
    unsafe {
        let zero = simd_arch::_mm_setzero_si128();
        let negative = simd_arch::_mm_cmpgt_epi8(zero, a);
        _mm_select_si128(negative, simd_arch::_mm_sub_epi8(zero, a), a)
    }
}

#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn _mm_abs_epi16_emu(a: __m128i) -> __m128i {
    unsafe {
        let sign = simd_arch::_mm_srai_epi16::<15>(a);
        simd_arch::_mm_sub_epi16(simd_arch::_mm_xor_si128(a, sign), sign)
    }
}

#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn _mm_abs_epi32_emu(a: __m128i) -> __m128i {
    unsafe {
        let sign = simd_arch::_mm_srai_epi32::<31>(a);
        simd_arch::_mm_sub_epi32(simd_arch::_mm_xor_si128(a, sign), sign)
    }
}

// ===== 32-bit saturating arithmetic (no SSE instruction at any level) =====

#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn _mm_adds_epu32_emu(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let v = simd_arch::_mm_add_epi32(a, b);
        simd_arch::_mm_or_si128(v, _mm_cmpgt_epu32(a, v))
    }
}

#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn _mm_subs_epu32_emu(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let v = simd_arch::_mm_sub_epi32(a, b);
        simd_arch::_mm_andnot_si128(_mm_cmpgt_epu32(v, a), v)
    }
}

/// `MAX` for lanes with `a >= 0`, `MIN` otherwise.
#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
unsafe fn saturation_bound_epi32(a: __m128i) -> __m128i {
    unsafe {
        simd_arch::_mm_add_epi32(
            simd_arch::_mm_srli_epi32::<31>(a),
            simd_arch::_mm_set1_epi32(i32::MAX),
        )
    }
}

#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn _mm_adds_epi32_emu(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let v = simd_arch::_mm_add_epi32(a, b);
        // sign set iff (a ^ b) >= 0 and (b ^ v) < 0
        let overflow = simd_arch::_mm_andnot_si128(
            simd_arch::_mm_xor_si128(a, b),
            simd_arch::_mm_xor_si128(b, v),
        );
        let mask = simd_arch::_mm_srai_epi32::<31>(overflow);
        _mm_select_si128(mask, saturation_bound_epi32(a), v)
    }
}

#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn _mm_subs_epi32_emu(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let v = simd_arch::_mm_sub_epi32(a, b);
        // sign set iff (a ^ b) < 0 and (a ^ v) < 0
        let overflow = simd_arch::_mm_and_si128(
            simd_arch::_mm_xor_si128(a, b),
            simd_arch::_mm_xor_si128(a, v),
        );
        let mask = simd_arch::_mm_srai_epi32::<31>(overflow);
        _mm_select_si128(mask, saturation_bound_epi32(a), v)
    }
}

// ===== Component access =====

macro_rules! mm_shuffle_ps_epi32 {
    ($a:expr, $b:expr, $imm8:expr) => {
        simd_arch::_mm_castps_si128(simd_arch::_mm_shuffle_ps::<{ $imm8 }>(
            simd_arch::_mm_castsi128_ps($a),
            simd_arch::_mm_castsi128_ps($b),
        ))
    };
}

/// `pextrd` without SSE4.1: broadcast the lane, then move the low lane out.
#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn _mm_extract_epi32_emu<const INDEX: i32>(a: __m128i) -> i32 {
    unsafe {
        match INDEX {
            0 => simd_arch::_mm_cvtsi128_si32(a),
            1 => simd_arch::_mm_cvtsi128_si32(simd_arch::_mm_shuffle_epi32::<0x55>(a)),
            2 => simd_arch::_mm_cvtsi128_si32(simd_arch::_mm_shuffle_epi32::<0xaa>(a)),
            _ => simd_arch::_mm_cvtsi128_si32(simd_arch::_mm_shuffle_epi32::<0xff>(a)),
        }
    }
}

/// `pinsrd` without SSE4.1: interleave the broadcast value with the source
/// and pick the four lanes back with one `shufps`.
#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn _mm_insert_epi32_emu<const INDEX: i32>(a: __m128i, s: i32) -> __m128i {
    unsafe {
        let value = simd_arch::_mm_set1_epi32(s);
        match INDEX {
            0 => {
                let b = simd_arch::_mm_unpacklo_epi32(value, a);
                mm_shuffle_ps_epi32!(b, a, mm_shuffle(3, 2, 3, 0))
            }
            1 => {
                let b = simd_arch::_mm_unpacklo_epi32(value, a);
                mm_shuffle_ps_epi32!(b, a, mm_shuffle(3, 2, 0, 1))
            }
            2 => {
                let b = simd_arch::_mm_unpackhi_epi32(value, a);
                mm_shuffle_ps_epi32!(a, b, mm_shuffle(3, 0, 1, 0))
            }
            _ => {
                let b = simd_arch::_mm_unpackhi_epi32(value, a);
                mm_shuffle_ps_epi32!(a, b, mm_shuffle(0, 1, 1, 0))
            }
        }
    }
}

// ===== Byte pack / unpack =====

/// Clamp four signed 32-bit lanes to `[0, 255]` and return them as bytes.
#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn _mm_pack_epi32_u8(a: __m128i) -> u32 {
    unsafe {
        let s16 = simd_arch::_mm_packs_epi32(a, a);
        let s8 = simd_arch::_mm_packus_epi16(s16, s16);
        simd_arch::_mm_cvtsi128_si32(s8) as u32
    }
}

/// `pmovzxbd` without SSE4.1: zero-extend through two unpacks.
#[inline(always)]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn _mm_cvtepu8_epi32_emu(a: __m128i) -> __m128i {
    unsafe {
        let zero = simd_arch::_mm_setzero_si128();
        simd_arch::_mm_unpacklo_epi16(simd_arch::_mm_unpacklo_epi8(a, zero), zero)
    }
}
