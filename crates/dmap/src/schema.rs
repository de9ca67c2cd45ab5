//! Record schemas: the base field set, standard extensions, and the
//! builder they are assembled with.
//!
//! A schema is "base template + additional field list". Extension vector
//! shapes are computed from the values of earlier scalar fields (`mppul`,
//! `mplgs`, `nrang`), so extension constructors apply caller scalar
//! overrides *before* declaring their vectors and vector overrides after.
//! Vector overrides therefore never change a declared shape.

use crate::error::DmapError;
use crate::record::Record;
use crate::value::{ArrayData, DmapArray, DmapScalar};

/// Accumulates named typed fields in declaration order and yields a
/// [`Record`].
#[derive(Debug, Default)]
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    /// Starts an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a builder pre-loaded with the base schema: the fixed set of
    /// scalar fields describing the producing instrument, timestamp, pulse
    /// sequence, and acquisition parameters.
    pub fn base() -> Self {
        let b = Self::new();
        b.scalar("radar.revision.major", DmapScalar::Char(0))
            .scalar("radar.revision.minor", DmapScalar::Char(0))
            .scalar("origin.code", DmapScalar::Char(0))
            .scalar("origin.time", DmapScalar::Str(String::new()))
            .scalar("origin.command", DmapScalar::Str(String::new()))
            .scalar("cp", DmapScalar::Short(0))
            .scalar("stid", DmapScalar::Short(0))
            .scalar("time.yr", DmapScalar::Short(0))
            .scalar("time.mo", DmapScalar::Short(0))
            .scalar("time.dy", DmapScalar::Short(0))
            .scalar("time.hr", DmapScalar::Short(0))
            .scalar("time.mt", DmapScalar::Short(0))
            .scalar("time.sc", DmapScalar::Short(0))
            .scalar("time.us", DmapScalar::Int(0))
            .scalar("txpow", DmapScalar::Short(0))
            .scalar("nave", DmapScalar::Short(0))
            .scalar("atten", DmapScalar::Short(0))
            .scalar("lagfr", DmapScalar::Short(0))
            .scalar("smsep", DmapScalar::Short(0))
            .scalar("ercod", DmapScalar::Short(0))
            .scalar("stat.agc", DmapScalar::Short(0))
            .scalar("noise.search", DmapScalar::Float(0.0))
            .scalar("noise.mean", DmapScalar::Float(0.0))
            .scalar("channel", DmapScalar::Short(0))
            .scalar("bmnum", DmapScalar::Short(0))
            .scalar("bmazm", DmapScalar::Float(0.0))
            .scalar("scan", DmapScalar::Short(0))
            .scalar("offset", DmapScalar::Short(0))
            .scalar("rxrise", DmapScalar::Short(0))
            .scalar("intt.sc", DmapScalar::Short(0))
            .scalar("intt.us", DmapScalar::Int(0))
            .scalar("txpl", DmapScalar::Short(0))
            .scalar("mpinc", DmapScalar::Short(0))
            .scalar("mppul", DmapScalar::Short(8))
            .scalar("mplgs", DmapScalar::Short(3))
            .scalar("nrang", DmapScalar::Short(4))
            .scalar("frang", DmapScalar::Short(0))
            .scalar("rsep", DmapScalar::Short(0))
            .scalar("xcf", DmapScalar::Short(0))
            .scalar("tfreq", DmapScalar::Short(0))
            .scalar("mxpwr", DmapScalar::Int(0))
            .scalar("lvmax", DmapScalar::Int(0))
            .scalar("combf", DmapScalar::Str(String::new()))
    }

    /// Adds a scalar field (or overwrites an earlier one of the same name
    /// in place).
    pub fn scalar(mut self, name: &str, value: DmapScalar) -> Self {
        self.record.add_scalar(name, value);
        self
    }

    /// Adds a vector field filled uniformly with `fill`.
    pub fn vector_blank(
        mut self,
        name: &str,
        fill: &DmapScalar,
        shape: &[usize],
    ) -> Result<Self, DmapError> {
        self.record.add_vector_blank(name, fill, shape)?;
        Ok(self)
    }

    /// Finishes the template.
    pub fn build(self) -> Record {
        self.record
    }
}

/// Reads a shape-determining scalar (`mppul`, `mplgs`, `nrang`) as a
/// dimension size.
fn dim_scalar(record: &Record, name: &str) -> Result<usize, DmapError> {
    let value = record
        .scalar(name)
        .ok_or_else(|| DmapError::UnknownField(name.to_owned()))?;
    let n = match value {
        DmapScalar::Short(v) => i64::from(*v),
        DmapScalar::Int(v) => i64::from(*v),
        other => {
            return Err(DmapError::TypeMismatch(format!(
                "scalar `{name}` of type {} cannot size a vector",
                other.wire_type()
            )))
        }
    };
    usize::try_from(n).map_err(|_| {
        DmapError::ShapeMismatch(format!("scalar `{name}` = {n} cannot size a vector"))
    })
}

/// Builds a raw-correlation (`rawacf`) record: the base schema plus raw
/// revision scalars, the pulse and lag tables, per-gate lag-zero power,
/// and the two correlation arrays shaped gates x lags x 2.
///
/// Scalar overrides are applied before the vectors are declared so the
/// caller's `mppul`/`mplgs`/`nrang` determine the array shapes; vector
/// overrides must match those shapes exactly.
pub fn rawacf_record(
    scalars: &[(&str, DmapScalar)],
    vectors: &[(&str, DmapArray)],
) -> Result<Record, DmapError> {
    let mut record = RecordBuilder::base()
        .scalar("rawacf.revision.major", DmapScalar::Int(5))
        .scalar("rawacf.revision.minor", DmapScalar::Int(0))
        .scalar("thr", DmapScalar::Float(0.0))
        .build();
    record.apply_overrides(scalars, &[])?;

    let mppul = dim_scalar(&record, "mppul")?;
    let mplgs = dim_scalar(&record, "mplgs")?;
    let nrang = dim_scalar(&record, "nrang")?;
    record.add_vector_blank("ptab", &DmapScalar::Short(0), &[mppul])?;
    record.add_vector_blank("ltab", &DmapScalar::Short(0), &[2, mplgs])?;
    record.add_vector_blank("slist", &DmapScalar::Short(0), &[nrang])?;
    record.add_vector_blank("pwr0", &DmapScalar::Float(0.0), &[nrang])?;
    record.add_vector_blank("acfd", &DmapScalar::Short(0), &[nrang, mplgs, 2])?;
    record.add_vector_blank("xcfd", &DmapScalar::Short(0), &[nrang, mplgs, 2])?;

    record.apply_overrides(&[], vectors)?;
    Ok(record)
}

/// Builds a fitted-parameter (`fitacf`) record: the base schema plus fit
/// revision and noise scalars and the per-gate fitted vectors (velocity,
/// width, power, their error estimates, and quality/ground flags).
pub fn fitacf_record(
    scalars: &[(&str, DmapScalar)],
    vectors: &[(&str, DmapArray)],
) -> Result<Record, DmapError> {
    let mut record = RecordBuilder::base()
        .scalar("fitacf.revision.major", DmapScalar::Int(0))
        .scalar("fitacf.revision.minor", DmapScalar::Int(0))
        .scalar("noise.sky", DmapScalar::Float(0.0))
        .scalar("noise.lag0", DmapScalar::Float(0.0))
        .scalar("noise.vel", DmapScalar::Float(0.0))
        .build();
    record.apply_overrides(scalars, &[])?;

    let mppul = dim_scalar(&record, "mppul")?;
    let mplgs = dim_scalar(&record, "mplgs")?;
    let nrang = dim_scalar(&record, "nrang")?;
    record.add_vector_blank("ptab", &DmapScalar::Short(0), &[mppul])?;
    record.add_vector_blank("ltab", &DmapScalar::Short(0), &[2, mplgs])?;
    record.add_vector_blank("pwr0", &DmapScalar::Float(0.0), &[nrang])?;
    record.add_vector_blank("slist", &DmapScalar::Short(0), &[nrang])?;
    record.add_vector_blank("nlag", &DmapScalar::Short(0), &[nrang])?;
    record.add_vector_blank("qflg", &DmapScalar::Char(0), &[nrang])?;
    record.add_vector_blank("gflg", &DmapScalar::Char(0), &[nrang])?;
    for name in [
        "p_l", "p_l_e", "p_s", "p_s_e", "v", "v_e", "w_l", "w_l_e", "w_s", "w_s_e", "sd_l",
        "sd_s", "sd_phi",
    ] {
        record.add_vector_blank(name, &DmapScalar::Float(0.0), &[nrang])?;
    }

    record.apply_overrides(&[], vectors)?;
    Ok(record)
}

/// Standard 8-pulse transmit pulse table (units of `mpinc`).
pub const PTAB_45KM: [i16; 8] = [0, 14, 22, 24, 27, 31, 42, 43];

/// Standard lag table for the 8-pulse sequence: 23 usable lag pairs plus
/// the alternate lag-zero pair, as (pulse, pulse) offsets.
pub const LTAB_45KM: [(i16, i16); 24] = [
    (0, 0),
    (42, 43),
    (22, 24),
    (24, 27),
    (27, 31),
    (22, 27),
    (24, 31),
    (14, 22),
    (22, 31),
    (14, 24),
    (31, 42),
    (31, 43),
    (14, 27),
    (0, 14),
    (27, 42),
    (27, 43),
    (14, 31),
    (24, 42),
    (24, 43),
    (22, 42),
    (22, 43),
    (0, 22),
    (0, 24),
    (43, 43),
];

/// Builds a rawacf record carrying the standard 45 km acquisition
/// parameters: the 8-pulse table, the 23-lag table, 75 range gates, and
/// the usual timing scalars.
pub fn standard_45km_rawacf() -> Result<Record, DmapError> {
    const MPLGS: usize = 23;
    const NRANG: i16 = 75;

    // ltab is declared [2, mplgs]: first row holds each pair's first
    // pulse, second row the second pulse.
    let mut ltab = Vec::with_capacity(2 * MPLGS);
    ltab.extend(LTAB_45KM.iter().take(MPLGS).map(|&(a, _)| a));
    ltab.extend(LTAB_45KM.iter().take(MPLGS).map(|&(_, b)| b));
    let ltab = DmapArray::new(vec![2, MPLGS], ArrayData::Short(ltab))?;
    let ptab = DmapArray::new(vec![PTAB_45KM.len()], ArrayData::Short(PTAB_45KM.to_vec()))?;
    let slist = DmapArray::new(
        vec![NRANG as usize],
        ArrayData::Short((0..NRANG).collect()),
    )?;

    rawacf_record(
        &[
            ("nave", DmapScalar::Short(30)),
            ("lagfr", DmapScalar::Short(1200)),
            ("smsep", DmapScalar::Short(300)),
            ("noise.search", DmapScalar::Float(5.0)),
            ("noise.mean", DmapScalar::Float(0.0)),
            ("txpl", DmapScalar::Short(300)),
            ("mpinc", DmapScalar::Short(1500)),
            ("mppul", DmapScalar::Short(8)),
            ("mplgs", DmapScalar::Short(MPLGS as i16)),
            ("nrang", DmapScalar::Short(NRANG)),
            ("frang", DmapScalar::Short(180)),
            ("rsep", DmapScalar::Short(45)),
            ("tfreq", DmapScalar::Short(10000)),
        ],
        &[("ptab", ptab), ("ltab", ltab), ("slist", slist)],
    )
}

/// Computes per-lag time offsets in seconds from a lag table shaped
/// `[2, n]` (n >= `mplgs`): `|second - first| * mpinc_us / 1e6` for each
/// of the first `mplgs` lag pairs.
pub fn lag_times(ltab: &DmapArray, mplgs: usize, mpinc_us: f32) -> Result<Vec<f32>, DmapError> {
    let pairs = match ltab.shape() {
        [2, n] if *n >= mplgs => *n,
        shape => {
            return Err(DmapError::ShapeMismatch(format!(
                "lag table shaped {shape:?} cannot supply {mplgs} lags"
            )))
        }
    };
    let data = match ltab.data() {
        ArrayData::Short(v) => v,
        other => {
            return Err(DmapError::TypeMismatch(format!(
                "lag table holds {}, expected short",
                other.wire_type()
            )))
        }
    };
    Ok((0..mplgs)
        .map(|i| {
            let lag = (i32::from(data[pairs + i]) - i32::from(data[i])).unsigned_abs();
            lag as f32 * (mpinc_us / 1e6)
        })
        .collect())
}
