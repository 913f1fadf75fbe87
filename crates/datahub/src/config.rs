/// Datahub constants shared by the value formatter and token counters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HubConfig;

impl HubConfig {
    // ===== text interop =====
    /// Significant digits produced by the general numeric formatter.
    pub const FORMAT_PRECISION: usize = 6;
    /// Widest text a numeric field may format to.
    ///
    /// General formatting of an `f64` at [`Self::FORMAT_PRECISION`] digits
    /// tops out at 13 characters (`-1.79769e+308`), well inside this width.
    pub const MAX_TEXT_WIDTH: usize = 31;
    /// Smallest decimal exponent the formatter still prints in fixed form.
    pub const MIN_FIXED_EXPONENT: i32 = -4;

    // ===== tokens =====
    /// First raw value issued by dispatchers and collections.
    pub const FIRST_TOKEN: u64 = 1;
    /// Largest raw element token `get_or_create` will create on request.
    pub const MAX_REQUESTED_TOKEN: u64 = u64::MAX / 2;

    /// Literal text used for `true` booleans.
    pub const TRUE_TEXT: &'static str = "true";
    /// Literal text used for `false` booleans.
    pub const FALSE_TEXT: &'static str = "false";
}
