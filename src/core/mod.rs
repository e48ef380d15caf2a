pub mod construction;
pub mod envelope;
pub mod load;
pub mod material_properties;
pub mod sol_air;
pub mod thermal_state;
pub mod units;
