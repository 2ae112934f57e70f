//! Export of finished worlds for persistence and external tools.

mod json;

pub use json::{
    encode, encode_context, read_json, seasonal_triple, to_json_string, write_json, ExportError,
    PlanetRecord, TileRecord, WorldRecord, FORMAT_VERSION,
};
