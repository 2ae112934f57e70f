//! Surface water routing on the tile graph.

mod rivers;

pub use rivers::{fill_and_route, route_rivers, Routing};
