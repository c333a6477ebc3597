mod coordinator;
mod lock;
#[cfg(feature = "lock")]
mod mutex;
mod snowflake;
mod state;
mod statistics;
mod status;

pub use coordinator::*;
pub use lock::*;
#[cfg_attr(docsrs, doc(cfg(feature = "lock")))]
#[cfg(feature = "lock")]
pub use mutex::*;
pub use snowflake::*;
pub use state::*;
pub use statistics::*;
pub use status::*;
