pub mod error;
pub mod types;
pub mod value;

pub use error::{ConsoleError, Result, StoreError, StoreResult, WorldError};
pub use types::{
    ActorId, ClassCatalog, ClassProfile, PointCatalog, PointKind, Position, TeleportPoint,
};
pub use value::{DataType, Value};

pub type Row = Vec<Value>;
