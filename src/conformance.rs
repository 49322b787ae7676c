//! Randomized cross-engine equivalence checks.
//!
//! `run_conformance::<A, B>` feeds identical edge-biased inputs to two engines
//! and compares every operation lane by lane. `A` is treated as the reference.
//! Inputs stay inside the equivalence contract: shift counts are below 32 and
//! `select` masks always come from a compare.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::simd_abstraction::{
    I32Lanes, IntVector, Lanes32, SignedIntVector, SimdEngine, shuffle_mask,
};

/// At most this many mismatches are kept in a report; the rest are only counted.
pub const MAX_RECORDED_MISMATCHES: usize = 32;

/// Parameters of one conformance run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConformanceConfig {
    /// Random input sets per vector shape.
    pub iterations: usize,
    /// Seed for `StdRng`; identical seeds give identical inputs.
    pub seed: u64,
}

impl Default for ConformanceConfig {
    fn default() -> Self {
        Self {
            iterations: 10_000,
            seed: 0x1A9E_128B_5EED_0001,
        }
    }
}

/// One operation on which the two engines disagreed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub shape: &'static str,
    pub operation: String,
    pub inputs: String,
    pub reference: String,
    pub candidate: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}({}): reference={} candidate={}",
            self.shape, self.operation, self.inputs, self.reference, self.candidate
        )
    }
}

/// Outcome of a conformance run.
#[derive(Debug, Clone, Default)]
pub struct ConformanceReport {
    pub reference: &'static str,
    pub candidate: &'static str,
    /// Individual operation results compared.
    pub checks: u64,
    /// Total disagreements, including the ones not recorded in `mismatches`.
    pub mismatch_count: u64,
    /// The first `MAX_RECORDED_MISMATCHES` disagreements.
    pub mismatches: Vec<Mismatch>,
}

impl ConformanceReport {
    pub fn is_clean(&self) -> bool {
        self.mismatch_count == 0
    }

    /// `Ok(self)` when both engines agreed on everything.
    pub fn into_result(self) -> anyhow::Result<Self> {
        if self.is_clean() {
            return Ok(self);
        }
        let first = self
            .mismatches
            .first()
            .map(ToString::to_string)
            .unwrap_or_default();
        anyhow::bail!(
            "{} of {} checks differ between {} and {}; first: {}",
            self.mismatch_count,
            self.checks,
            self.reference,
            self.candidate,
            first
        )
    }
}

/// Lane scalars that can be drawn with a bias toward boundary values.
pub trait SampleLane: Copy + fmt::Debug {
    fn sample(rng: &mut StdRng) -> Self;
}

macro_rules! impl_sample_lane {
    ($($t:ty),*) => {
        $(
            impl SampleLane for $t {
                fn sample(rng: &mut StdRng) -> Self {
                    const EDGES: [$t; 7] = [
                        0,
                        1,
                        (0 as $t).wrapping_sub(1),
                        <$t>::MAX,
                        <$t>::MIN,
                        <$t>::MAX - 1,
                        <$t>::MIN.wrapping_add(1),
                    ];
                    if rng.gen_ratio(1, 4) {
                        EDGES[rng.gen_range(0..EDGES.len())]
                    } else {
                        rng.r#gen()
                    }
                }
            }
        )*
    };
}

impl_sample_lane!(u8, u16, u32, i8, i16, i32);

fn sample_array<V>(rng: &mut StdRng) -> V::Array
where
    V: IntVector,
    V::Scalar: SampleLane,
{
    let mut lanes = V::Array::default();
    for lane in lanes.as_mut() {
        *lane = V::Scalar::sample(rng);
    }
    lanes
}

/// Second operand: independent lanes, with about a quarter copied from `x`
/// so equality comparisons and zero differences are exercised.
fn sample_partner<V>(rng: &mut StdRng, x: &V::Array) -> V::Array
where
    V: IntVector,
    V::Scalar: SampleLane,
{
    let mut lanes = sample_array::<V>(rng);
    for (lane, &src) in lanes.as_mut().iter_mut().zip(x.as_ref()) {
        if rng.gen_ratio(1, 4) {
            *lane = src;
        }
    }
    lanes
}

struct Checker {
    report: ConformanceReport,
}

impl Checker {
    fn record<T: PartialEq + fmt::Debug>(
        &mut self,
        shape: &'static str,
        operation: &str,
        inputs: impl FnOnce() -> String,
        reference: T,
        candidate: T,
    ) {
        self.report.checks += 1;
        if reference == candidate {
            return;
        }
        self.report.mismatch_count += 1;
        let mismatch = Mismatch {
            shape,
            operation: operation.to_string(),
            inputs: inputs(),
            reference: format!("{reference:?}"),
            candidate: format!("{candidate:?}"),
        };
        log::error!("{}", mismatch);
        if self.report.mismatches.len() < MAX_RECORDED_MISMATCHES {
            self.report.mismatches.push(mismatch);
        }
    }
}

macro_rules! check_binary {
    ($chk:ident, $shape:expr, $A:ty, $B:ty, $x:expr, $y:expr; $($op:ident),+ $(,)?) => {
        $({
            let r = <$A>::from_array($x).$op(<$A>::from_array($y)).to_array();
            let c = <$B>::from_array($x).$op(<$B>::from_array($y)).to_array();
            $chk.record($shape, stringify!($op), || format!("{:?}, {:?}", $x, $y), r, c);
        })+
    };
}

macro_rules! check_unary {
    ($chk:ident, $shape:expr, $A:ty, $B:ty, $x:expr; $($op:ident $(::<$n:literal>)?),+ $(,)?) => {
        $({
            let r = <$A>::from_array($x).$op$(::<$n>)?().to_array();
            let c = <$B>::from_array($x).$op$(::<$n>)?().to_array();
            let name = concat!(stringify!($op) $(, "::<", stringify!($n), ">")?);
            $chk.record($shape, name, || format!("{:?}", $x), r, c);
        })+
    };
}

/// Everything in `IntVector`.
fn check_int_vector<VA, VB>(chk: &mut Checker, rng: &mut StdRng, shape: &'static str)
where
    VA: IntVector,
    VA::Scalar: SampleLane,
    VB: IntVector<Scalar = VA::Scalar, Array = VA::Array>,
{
    let x = sample_array::<VA>(rng);
    let y = sample_partner::<VA>(rng, &x);

    check_binary!(chk, shape, VA, VB, x, y;
        add, sub, mullo, adds, subs,
        and, nand, or, xor,
        compare_eq, compare_gt, compare_neq, compare_lt, compare_le, compare_ge,
        min, max, unpacklo, unpackhi,
    );
    check_unary!(chk, shape, VA, VB, x; not);

    let s = VA::Scalar::sample(rng);
    chk.record(shape, "set1", || format!("{s:?}"), VA::set1(s).to_array(), VB::set1(s).to_array());
    chk.record(shape, "zero", String::new, VA::zero().to_array(), VB::zero().to_array());

    // Unaligned memory round trip at an odd offset.
    let mut buf = vec![VA::Scalar::sample(rng); VA::LANES + 1];
    buf[1..].copy_from_slice(x.as_ref());
    // SAFETY: `buf` holds `LANES + 1` scalars, so `LANES` are readable from index 1.
    let (ra, rb) = unsafe { (VA::uload(buf.as_ptr().add(1)), VB::uload(buf.as_ptr().add(1))) };
    chk.record(shape, "uload", || format!("{x:?}"), ra.to_array(), rb.to_array());

    let mut out_a = buf.clone();
    let mut out_b = buf.clone();
    // SAFETY: as above, for writes.
    unsafe {
        VA::from_array(y).ustore(out_a.as_mut_ptr().add(1));
        VB::from_array(y).ustore(out_b.as_mut_ptr().add(1));
    }
    chk.record(shape, "ustore", || format!("{y:?}"), out_a, out_b);

    for (name, ma, mb) in [
        (
            "select(compare_gt)",
            VA::from_array(x).compare_gt(VA::from_array(y)),
            VB::from_array(x).compare_gt(VB::from_array(y)),
        ),
        (
            "select(compare_eq)",
            VA::from_array(x).compare_eq(VA::from_array(y)),
            VB::from_array(x).compare_eq(VB::from_array(y)),
        ),
    ] {
        let r = VA::select(ma, VA::from_array(x), VA::from_array(y)).to_array();
        let c = VB::select(mb, VB::from_array(x), VB::from_array(y)).to_array();
        chk.record(shape, name, || format!("{x:?}, {y:?}"), r, c);
    }
}

fn check_signed<VA, VB>(chk: &mut Checker, rng: &mut StdRng, shape: &'static str)
where
    VA: SignedIntVector,
    VA::Scalar: SampleLane,
    VB: SignedIntVector<Scalar = VA::Scalar, Array = VA::Array>,
{
    let x = sample_array::<VA>(rng);
    check_unary!(chk, shape, VA, VB, x; abs, neg);
}

macro_rules! check_shuffles {
    ($chk:ident, $shape:expr, $A:ty, $B:ty, $x:expr; $(($i:literal, $j:literal, $k:literal, $l:literal)),+) => {
        $({
            const MASK: i32 = shuffle_mask($i, $j, $k, $l);
            let r = <$A>::from_array($x).shuffle::<MASK>().to_array();
            let c = <$B>::from_array($x).shuffle::<MASK>().to_array();
            let name = concat!("shuffle(", $i, ",", $j, ",", $k, ",", $l, ")");
            $chk.record($shape, name, || format!("{:?}", $x), r, c);
        })+
    };
}

macro_rules! check_components {
    ($chk:ident, $shape:expr, $A:ty, $B:ty, $x:expr, $s:expr; $($i:literal),+) => {
        $({
            let r = <$A>::from_array($x).get_component::<$i>();
            let c = <$B>::from_array($x).get_component::<$i>();
            $chk.record($shape, concat!("get_component::<", $i, ">"), || format!("{:?}", $x), r, c);

            let r = <$A>::from_array($x).set_component::<$i>($s).to_array();
            let c = <$B>::from_array($x).set_component::<$i>($s).to_array();
            $chk.record(
                $shape,
                concat!("set_component::<", $i, ">"),
                || format!("{:?}, {:?}", $x, $s),
                r,
                c,
            );
        })+
    };
}

/// Everything in `Lanes32`.
fn check_lanes32<VA, VB>(chk: &mut Checker, rng: &mut StdRng, shape: &'static str)
where
    VA: Lanes32,
    VA::Scalar: SampleLane,
    VB: Lanes32<Scalar = VA::Scalar, Array = VA::Array>,
{
    let x = sample_array::<VA>(rng);
    let s = VA::Scalar::sample(rng);

    check_shuffles!(chk, shape, VA, VB, x;
        (0, 1, 2, 3), (3, 2, 1, 0), (0, 0, 0, 0), (3, 3, 3, 3),
        (1, 0, 3, 2), (2, 3, 0, 1), (0, 0, 2, 0), (1, 2, 3, 0)
    );
    check_components!(chk, shape, VA, VB, x, s; 0, 1, 2, 3);

    check_unary!(chk, shape, VA, VB, x;
        sll::<0>, sll::<1>, sll::<7>, sll::<16>, sll::<31>,
        srl::<0>, srl::<1>, srl::<7>, srl::<16>, srl::<31>,
    );

    let lanes = x.as_ref();
    let (a, b, c, d) = (lanes[0], lanes[1], lanes[2], lanes[3]);
    chk.record(
        shape,
        "set4",
        || format!("{x:?}"),
        VA::set4(a, b, c, d).to_array(),
        VB::set4(a, b, c, d).to_array(),
    );
}

/// Everything in `I32Lanes`.
fn check_i32_lanes<VA, VB>(chk: &mut Checker, rng: &mut StdRng, shape: &'static str)
where
    VA: I32Lanes<Array = [i32; 4]>,
    VB: I32Lanes<Array = [i32; 4]>,
{
    let x = sample_array::<VA>(rng);
    // Values around the pack clamp range.
    let near: [i32; 4] = core::array::from_fn(|_| rng.gen_range(-300..=300));

    check_unary!(chk, shape, VA, VB, x;
        sra::<0>, sra::<1>, sra::<7>, sra::<16>, sra::<31>,
    );

    for lanes in [x, near] {
        let (va, vb) = (VA::from_array(lanes), VB::from_array(lanes));
        chk.record(shape, "get_mask", || format!("{lanes:?}"), va.get_mask(), vb.get_mask());
        chk.record(shape, "pack", || format!("{lanes:?}"), va.pack(), vb.pack());
    }

    let packed: u32 = rng.r#gen();
    chk.record(
        shape,
        "unpack",
        || format!("{packed:#010x}"),
        VA::unpack(packed).to_array(),
        VB::unpack(packed).to_array(),
    );
}

/// Compare engine `B` against reference engine `A` on every operation.
pub fn run_conformance<A: SimdEngine, B: SimdEngine>(config: &ConformanceConfig) -> ConformanceReport {
    log::info!(
        "Checking {} against {} ({} iterations, seed {:#x})",
        B::NAME,
        A::NAME,
        config.iterations,
        config.seed
    );

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut chk = Checker {
        report: ConformanceReport {
            reference: A::NAME,
            candidate: B::NAME,
            ..Default::default()
        },
    };

    let progress_step = (config.iterations / 10).max(1);
    for i in 0..config.iterations {
        check_int_vector::<A::U8x16, B::U8x16>(&mut chk, &mut rng, "u8x16");
        check_int_vector::<A::I8x16, B::I8x16>(&mut chk, &mut rng, "i8x16");
        check_int_vector::<A::U16x8, B::U16x8>(&mut chk, &mut rng, "u16x8");
        check_int_vector::<A::I16x8, B::I16x8>(&mut chk, &mut rng, "i16x8");
        check_int_vector::<A::U32x4, B::U32x4>(&mut chk, &mut rng, "u32x4");
        check_int_vector::<A::I32x4, B::I32x4>(&mut chk, &mut rng, "i32x4");

        check_signed::<A::I8x16, B::I8x16>(&mut chk, &mut rng, "i8x16");
        check_signed::<A::I16x8, B::I16x8>(&mut chk, &mut rng, "i16x8");
        check_signed::<A::I32x4, B::I32x4>(&mut chk, &mut rng, "i32x4");

        check_lanes32::<A::U32x4, B::U32x4>(&mut chk, &mut rng, "u32x4");
        check_lanes32::<A::I32x4, B::I32x4>(&mut chk, &mut rng, "i32x4");
        check_i32_lanes::<A::I32x4, B::I32x4>(&mut chk, &mut rng, "i32x4");

        if (i + 1) % progress_step == 0 {
            log::debug!(
                "{}/{} iterations, {} checks, {} mismatches",
                i + 1,
                config.iterations,
                chk.report.checks,
                chk.report.mismatch_count
            );
        }
    }

    let report = chk.report;
    if report.is_clean() {
        log::info!("{} checks passed", report.checks);
    } else {
        log::error!("{} of {} checks failed", report.mismatch_count, report.checks);
    }
    report
}
