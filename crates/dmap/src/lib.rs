//! Self-describing binary record codec for instrument data.
//!
//! The dmap wire format persists and streams structured instrument data as
//! named scalar fields and named n-dimensional numeric arrays, each with an
//! explicit one-byte type tag and, for arrays, dimensions stored inline.
//! Records are framed by a magic code in a 16-byte header; a stream carries
//! no other delimiter, so the decoder resynchronizes on the magic to
//! recover record boundaries from a feed that starts mid-record.
//!
//! # Example
//!
//! ```
//! use dmap::{DmapDecoder, DmapEncoder, DmapScalar};
//!
//! let record = dmap::rawacf_record(
//!     &[("rsep", DmapScalar::Short(45))],
//!     &[],
//! )?;
//! let bytes = DmapEncoder::new().encode(&record)?;
//! let decoded = DmapDecoder::new().read_record(&bytes[..])?;
//! assert_eq!(decoded.scalar("rsep"), Some(&DmapScalar::Short(45)));
//! # Ok::<(), dmap::DmapError>(())
//! ```
//!
//! # Framing compatibility
//!
//! Historical writers frame files with record code 33 while the live feed
//! frames with 65537. Encoder and decoder both take the magic as a
//! parameter (defaulting to the file code) so the integrator matches the
//! two explicitly; see [`constants`].

pub mod constants;

mod collab;
mod decoder;
mod encoder;
mod error;
mod json;
mod record;
mod schema;
mod value;

pub use collab::FitterConfig;
pub use decoder::{DecodedRecord, DmapDecoder, Records};
pub use encoder::DmapEncoder;
pub use error::DmapError;
pub use json::project;
pub use record::Record;
pub use schema::{
    fitacf_record, lag_times, rawacf_record, standard_45km_rawacf, RecordBuilder, LTAB_45KM,
    PTAB_45KM,
};
pub use value::{ArrayData, DmapArray, DmapScalar, DmapValue, WireType};
