/// Seed for the fixed evaluation pair/triplet sets. The published reference
/// sets were generated with this seed; changing it invalidates comparisons.
pub const FIXED_SET_SEED: u64 = 29;

/// Seed for the deterministic match-table downsampling shuffle.
pub const PROTOCOL_SHUFFLE_SEED: u64 = 0;

/// Upper bound on loop-until-distinct rejection sampling. Unreachable for any
/// bucket of size >= 2 with a sane RNG; turns a pathological source into an
/// error instead of a hang.
pub const MAX_RESAMPLE_ATTEMPTS: usize = 64;

/// Number of binary occlusion indicator columns in IJB-C metadata
/// (`OCC1`..`OCC18`).
pub const OCCLUSION_COLUMNS: usize = 18;

/// In-band marker for impersonator captures in DFW file names. Such captures
/// are identity-keyed by the person being imitated, encoded in the file name
/// rather than the directory.
pub const IMPERSONATOR_MARKER: &str = "_I_";

/// Length of the trailing `_NNN.ext` segment stripped from an impersonator
/// file name when deriving its identity.
pub const IMPERSONATOR_SUFFIX_LEN: usize = 8;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
