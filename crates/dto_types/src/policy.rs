use bitflags::bitflags;

bitflags! {
    /// Which kinds of field receive an implicit default when absent.
    ///
    /// Callers holding a raw bitmask can use
    /// [`DefaultPolicy::from_bits_truncate`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DefaultPolicy: u32 {
        /// Array and collection fields default to an empty array.
        const ARRAY_DEFAULT_TO_EMPTY_ARRAY = 1 << 0;
        /// Bool fields default to `false`.
        const BOOL_DEFAULT_TO_FALSE        = 1 << 1;
        /// Nullable fields default to `null`.
        const NULLABLE_DEFAULT_TO_NULL     = 1 << 2;
    }
}
