pub mod coordinates;
pub mod iterator;
pub mod key;
pub mod mapper;
pub mod schema;
pub mod spatial;
pub mod util;

pub use coordinates::{
    Coordinate, CoordinateOrder, Coordinates, CoordsDisplay, INFINITE_LENGTH, MAX_COORDINATE, MIN_COORDINATE,
    coordinates_compare,
};
pub use iterator::{
    ConstIterator, MultiConstIterators, OverlappingChunksIterator, RegionCoordinatesIterator,
    SpatialRangesChunkPosIterator,
};
pub use key::CoordinatesToKey;
pub use mapper::{ArrayCoordinatesMapper, CoordinatesMapper};
pub use schema::{ArrayDesc, DimensionDesc};
pub use spatial::{DominanceRelationship, SpatialRange, SpatialRanges, calculate_dominance, is_dominated_by};
pub use util::{Result, Status};
