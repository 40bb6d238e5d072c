//! Water-heater capabilities advertised to clients.

bitflags::bitflags! {
    /// Set of features a water-heater entity currently supports.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WaterHeaterFeatures: u32 {
        /// The target temperature can be set.
        const TARGET_TEMPERATURE = 1 << 0;
        /// The operation mode can be selected.
        const OPERATION_MODE = 1 << 1;
    }
}
