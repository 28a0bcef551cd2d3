use bitflags::bitflags;

bitflags! {
    /// The set of optional facets a panel module implements.
    ///
    /// Dispatch never inspects concrete types; a module opts into a phase purely by
    /// exposing the corresponding facet, and this set mirrors what it exposes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Capabilities: u32 {
        const MAIN = 1 << 0;
        const SUB = 1 << 1;
        const CONFIGURABLE = 1 << 2;
        const ENRICHER = 1 << 3;
        const DATA_PROVIDER = 1 << 4;
        const SETTINGS_PROVIDER = 1 << 5;
        const SHORT_INFO_PROVIDER = 1 << 6;
        const RESOURCE_PROVIDER = 1 << 7;
        const SUBMODULE_PROVIDER = 1 << 8;
        const CONTENT_PROVIDER = 1 << 9;

        /// A module rendered as a parent of its submodules with a short status line.
        const DISPLAY_PARENT = Self::SUBMODULE_PROVIDER.bits() | Self::SHORT_INFO_PROVIDER.bits();
    }
}

impl Capabilities {
    /// Whether the module takes part in a phase only when enabled for the user.
    #[must_use]
    pub const fn is_gated(self) -> bool {
        self.contains(Self::CONFIGURABLE)
    }
}
