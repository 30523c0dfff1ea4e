use derive_more::Display;

/// Endianness. Either `big` or `little`.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Display)]
pub enum Endianness {
    /// Little endian.
    #[display("little")]
    Little,

    /// Big endian.
    #[display("big")]
    Big,
}

impl Endianness {
    /// Return the Zarr V2 typestring byte order character (`<` or `>`).
    #[must_use]
    pub const fn typestring_char(self) -> char {
        match self {
            Self::Little => '<',
            Self::Big => '>',
        }
    }
}
