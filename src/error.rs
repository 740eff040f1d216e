/// Errors reported by table construction and `HTable::add`.
///
/// Absence is never an error: lookups and deletes return `Option`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// Rounding the requested bucket count up to a power of two overflowed
    CapacityOverflow,

    /// The bucket array could not be allocated
    Alloc,

    /// The key does not name a live record in the arena
    NoSuchEntry,

    /// The record's entry is already linked into a table
    AlreadyLinked,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HtableError: {self:?}")
    }
}

impl std::error::Error for Error {}

/// Table result
pub type Result<T> = std::result::Result<T, Error>;
